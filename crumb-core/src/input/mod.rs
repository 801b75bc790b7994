//! Rotary encoder and push button processing
//!
//! Pure decoding logic shared by the GPIO-level drivers: quadrature
//! decoding into a lock-free counter and edge-latched debouncing.

pub mod button;
pub mod encoder;

pub use button::{ButtonDebouncer, DEBOUNCE_MS};
pub use encoder::{EncoderCounter, QuadratureDecoder};
