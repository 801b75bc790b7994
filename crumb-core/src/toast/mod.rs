//! Toasting control
//!
//! The toast run is split into the loss estimate taken before the bread
//! goes in, the [`ToastSession`] that decides when to stop heating, and
//! the [`ToastFlow`] that sequences placement, settling and toasting.

pub mod estimate;
pub mod flow;
pub mod session;

pub use estimate::LossEstimate;
pub use flow::{Phase, ToastFlow};
pub use session::{Termination, ToastSession};

/// Clamp to 0..=1, mapping NaN to 0
#[inline]
pub(crate) fn unit_clamp(value: f32) -> f32 {
    if value >= 1.0 {
        1.0
    } else if value > 0.0 {
        value
    } else {
        0.0
    }
}
