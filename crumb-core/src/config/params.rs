//! Toasting parameters
//!
//! Every constant the control algorithm depends on lives here so the
//! firmware can override it and tests can shrink timeouts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which confirmation question the toast mode asks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfirmKind {
    /// "Start toasting?" - options No/Yes, No returns to the menu.
    /// Yes starts a weight-only session.
    StartToasting,
    /// "Temp jig set up?" - options Yes/No, both start toasting.
    /// Yes selects the temperature-guided variant.
    #[default]
    TemperatureJig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Cold anchor must be below the warm anchor
    AnchorOrder,
    /// Loss fractions must lie in (0, 1) with cold above warm
    LossFraction,
    /// A threshold is not a positive finite number
    Threshold,
    /// A timeout or interval is zero
    Timing,
}

/// Toasting algorithm parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ToastParams {
    /// Confirmation dialog semantics
    pub confirm: ConfirmKind,

    /// Bread at or below this temperature gets the cold loss target (°C)
    pub cold_anchor_c: f32,
    /// Bread at or above this temperature gets the warm loss target (°C)
    pub warm_anchor_c: f32,
    /// Weight-loss fraction for cold bread
    pub cold_loss_fraction: f32,
    /// Weight-loss fraction for warm bread
    pub warm_loss_fraction: f32,

    /// Weight change that counts as bread placed (g)
    pub placement_threshold_g: f32,
    /// Give up waiting for bread after this long (ms)
    pub placement_timeout_ms: u32,

    /// Consecutive samples closer than this are "still" (g)
    pub settle_delta_g: f32,
    /// Weight must stay still this long to be accepted (ms)
    pub settle_window_ms: u32,
    /// Accept whatever is on the scale after this long (ms)
    pub settle_timeout_ms: u32,

    /// Below this the weight target is treated as unreachable (g)
    pub min_required_loss_g: f32,

    /// Temperature needed before the hold timer can start (°C)
    pub hold_min_temp_c: f32,
    /// Consecutive samples closer than this are "stable" (°C)
    pub hold_delta_c: f32,
    /// Stable temperature held this long finishes the toast (ms)
    pub hold_duration_ms: u32,

    /// Unconditional maximum session length (ms)
    pub failsafe_ms: u32,

    /// Splash duration on boot (ms)
    pub splash_ms: u32,

    /// Tick interval while navigating menus and dialogs (ms)
    pub ui_poll_ms: u32,
    /// Tick interval during placement, settling and toasting (ms)
    pub toast_poll_ms: u32,
    /// Tick interval of the live sensor screen (ms)
    pub showcase_poll_ms: u32,
}

impl Default for ToastParams {
    fn default() -> Self {
        Self {
            confirm: ConfirmKind::TemperatureJig,
            cold_anchor_c: 12.5,
            warm_anchor_c: 20.0,
            cold_loss_fraction: 0.15,
            warm_loss_fraction: 0.10,
            placement_threshold_g: 5.0,
            placement_timeout_ms: 15_000,
            settle_delta_g: 0.5,
            settle_window_ms: 1_000,
            settle_timeout_ms: 20_000,
            min_required_loss_g: 0.01,
            hold_min_temp_c: 120.0,
            hold_delta_c: 0.5,
            hold_duration_ms: 150_000,
            failsafe_ms: 300_000,
            splash_ms: 2_000,
            ui_poll_ms: 10,
            toast_poll_ms: 50,
            showcase_poll_ms: 100,
        }
    }
}

impl ToastParams {
    /// Check the parameters are self-consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = |v: f32| v.is_finite();

        if !finite(self.cold_anchor_c)
            || !finite(self.warm_anchor_c)
            || self.cold_anchor_c >= self.warm_anchor_c
        {
            return Err(ConfigError::AnchorOrder);
        }

        let in_unit = |v: f32| v > 0.0 && v < 1.0;
        if !in_unit(self.cold_loss_fraction)
            || !in_unit(self.warm_loss_fraction)
            || self.cold_loss_fraction < self.warm_loss_fraction
        {
            return Err(ConfigError::LossFraction);
        }

        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.placement_threshold_g)
            || !positive(self.settle_delta_g)
            || !positive(self.min_required_loss_g)
            || !positive(self.hold_delta_c)
            || !finite(self.hold_min_temp_c)
        {
            return Err(ConfigError::Threshold);
        }

        if self.placement_timeout_ms == 0
            || self.settle_window_ms == 0
            || self.settle_timeout_ms < self.settle_window_ms
            || self.hold_duration_ms == 0
            || self.failsafe_ms == 0
            || self.ui_poll_ms == 0
            || self.toast_poll_ms == 0
            || self.showcase_poll_ms == 0
        {
            return Err(ConfigError::Timing);
        }

        Ok(())
    }
}
