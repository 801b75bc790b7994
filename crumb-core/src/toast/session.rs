//! Active toast session and its termination decision

use crate::config::ToastParams;
use crate::sensors::SensorSnapshot;
use crate::{abs_diff, elapsed_ms};

use super::estimate::LossEstimate;
use super::unit_clamp;

/// Why a toast session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Bread lost the target share of its weight
    WeightTarget,
    /// Surface temperature held steady long enough
    TemperatureHold,
    /// Maximum session length reached
    FailSafe,
}

/// State of one toast run from heater-on to heater-off
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToastSession {
    pub bread_start_temp_c: f32,
    pub loss_fraction: f32,
    pub start_weight_g: f32,
    pub target_weight_g: f32,
    pub required_loss_g: f32,
    pub temp_guided: bool,
    pub temp_stable: bool,
    pub temp_stable_since_ms: Option<u32>,
    pub started_at_ms: u32,
    last_temp_c: Option<f32>,
    progress: f32,
    params: ToastParams,
}

impl ToastSession {
    /// Start a session on a settled start weight
    pub fn start(
        estimate: &LossEstimate,
        start_weight_g: f32,
        temp_guided: bool,
        now_ms: u32,
        params: &ToastParams,
    ) -> Self {
        let target_weight_g = start_weight_g * (1.0 - estimate.loss_fraction);

        Self {
            bread_start_temp_c: estimate.bread_start_temp_c,
            loss_fraction: estimate.loss_fraction,
            start_weight_g,
            target_weight_g,
            required_loss_g: start_weight_g - target_weight_g,
            temp_guided,
            temp_stable: false,
            temp_stable_since_ms: None,
            started_at_ms: now_ms,
            last_temp_c: None,
            progress: 0.0,
            params: *params,
        }
    }

    /// Fraction of the required weight loss achieved, 0..=1
    pub fn weight_progress(&self, current_weight_g: f32) -> f32 {
        if self.required_loss_g <= self.params.min_required_loss_g {
            return 0.0;
        }
        unit_clamp((self.start_weight_g - current_weight_g) / self.required_loss_g)
    }

    /// Fraction of the temperature hold achieved, 0..=1
    pub fn hold_progress(&self, now_ms: u32) -> f32 {
        match self.temp_stable_since_ms {
            Some(since) if self.temp_stable => unit_clamp(
                elapsed_ms(now_ms, since) as f32 / self.params.hold_duration_ms as f32,
            ),
            _ => 0.0,
        }
    }

    /// Progress shown on the display as of the last update
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Milliseconds since the heater came on
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        elapsed_ms(now_ms, self.started_at_ms)
    }

    /// Feed one sample; returns the termination reason once the session
    /// is done
    pub fn update(&mut self, snapshot: &SensorSnapshot, now_ms: u32) -> Option<Termination> {
        let weight_g = snapshot.weight_g;

        if self.temp_guided {
            self.track_temperature(snapshot.temperature_c, now_ms);
        }

        let weight_progress = self.weight_progress(weight_g);
        self.progress = if self.temp_guided {
            weight_progress.max(self.hold_progress(now_ms))
        } else {
            weight_progress
        };

        if weight_g <= self.target_weight_g {
            return Some(Termination::WeightTarget);
        }

        if self.temp_guided && self.temp_stable {
            if let Some(since) = self.temp_stable_since_ms {
                if elapsed_ms(now_ms, since) >= self.params.hold_duration_ms {
                    return Some(Termination::TemperatureHold);
                }
            }
        }

        if self.elapsed_ms(now_ms) >= self.params.failsafe_ms {
            return Some(Termination::FailSafe);
        }

        None
    }

    fn track_temperature(&mut self, temp_c: f32, now_ms: u32) {
        let hot = temp_c >= self.params.hold_min_temp_c;
        let steady = match self.last_temp_c {
            Some(last) => abs_diff(temp_c, last) < self.params.hold_delta_c,
            None => false,
        };
        self.last_temp_c = Some(temp_c);

        if hot && steady {
            if !self.temp_stable {
                self.temp_stable = true;
                self.temp_stable_since_ms = Some(now_ms);
            }
        } else {
            self.temp_stable = false;
            self.temp_stable_since_ms = None;
        }
    }
}
