//! Weight-loss target from the starting bread temperature
//!
//! Cold or frozen bread holds more water and has to lose a larger share
//! of its weight before it is toasted.

use crate::config::ToastParams;

use super::unit_clamp;

/// Loss target derived from one temperature sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LossEstimate {
    /// Temperature the estimate was based on (°C)
    pub bread_start_temp_c: f32,
    /// Fraction of the start weight to remove
    pub loss_fraction: f32,
    /// Bread is colder than the warm anchor
    pub show_frozen: bool,
    /// Extra loss over the warm-bread target, in percent
    pub extra_percent: f32,
}

impl LossEstimate {
    pub fn from_temperature(temp_c: f32, params: &ToastParams) -> Self {
        // An unreadable thermometer must not push the target up
        let temp_c = if temp_c.is_finite() {
            temp_c
        } else {
            params.warm_anchor_c
        };

        let loss_fraction = loss_fraction(temp_c, params);

        Self {
            bread_start_temp_c: temp_c,
            loss_fraction,
            show_frozen: temp_c < params.warm_anchor_c,
            extra_percent: (loss_fraction - params.warm_loss_fraction) * 100.0,
        }
    }
}

/// Linear interpolation between the cold and warm loss targets
pub fn loss_fraction(temp_c: f32, params: &ToastParams) -> f32 {
    let span = params.warm_anchor_c - params.cold_anchor_c;
    let t = unit_clamp((temp_c - params.cold_anchor_c) / span);
    params.cold_loss_fraction - t * (params.cold_loss_fraction - params.warm_loss_fraction)
}
