//! Toast run sequencing: placement, settling, toasting
//!
//! Phases only ever move forward. Every phase that waits on the bread
//! has a timeout, and the toasting phase has the fail-safe, so a run
//! always ends no matter what the sensors report.

use crate::config::ToastParams;
use crate::sensors::SensorSnapshot;
use crate::state::Event;
use crate::ui::View;
use crate::{abs_diff, elapsed_ms};

use super::estimate::LossEstimate;
use super::session::{Termination, ToastSession};

/// Current step of a toast run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Waiting for the weight to move away from the empty-scale baseline
    Placement { baseline_g: f32, since_ms: u32 },
    /// Waiting for consecutive samples to agree for the stability window
    Settling {
        last_g: f32,
        window_start_ms: u32,
        since_ms: u32,
    },
    /// Heater on
    Toasting(ToastSession),
    /// Session ended
    Done(Termination),
}

/// One toast run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToastFlow {
    estimate: LossEstimate,
    temp_guided: bool,
    phase: Phase,
    params: ToastParams,
}

impl ToastFlow {
    /// Estimate the loss target from the current temperature and capture
    /// the empty-scale baseline
    pub fn begin(
        snapshot: &SensorSnapshot,
        temp_guided: bool,
        now_ms: u32,
        params: &ToastParams,
    ) -> Self {
        Self {
            estimate: LossEstimate::from_temperature(snapshot.temperature_c, params),
            temp_guided,
            phase: Phase::Placement {
                baseline_g: snapshot.weight_g,
                since_ms: now_ms,
            },
            params: *params,
        }
    }

    pub fn estimate(&self) -> &LossEstimate {
        &self.estimate
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn temp_guided(&self) -> bool {
        self.temp_guided
    }

    /// The running session, once the heater is on
    pub fn session(&self) -> Option<&ToastSession> {
        match &self.phase {
            Phase::Toasting(session) => Some(session),
            _ => None,
        }
    }

    /// True once a termination reason has been reached
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    /// Advance by one sample
    ///
    /// Returns an event whenever the phase changes.
    pub fn step(&mut self, snapshot: &SensorSnapshot, now_ms: u32) -> Option<Event> {
        let weight_g = snapshot.weight_g;

        match &mut self.phase {
            Phase::Placement {
                baseline_g,
                since_ms,
            } => {
                if abs_diff(weight_g, *baseline_g) > self.params.placement_threshold_g {
                    self.phase = settling(weight_g, now_ms);
                    return Some(Event::BreadPlaced { weight_g });
                }
                if elapsed_ms(now_ms, *since_ms) >= self.params.placement_timeout_ms {
                    self.phase = settling(weight_g, now_ms);
                    return Some(Event::PlacementTimedOut { weight_g });
                }
                None
            }

            Phase::Settling {
                last_g,
                window_start_ms,
                since_ms,
            } => {
                if abs_diff(weight_g, *last_g) < self.params.settle_delta_g {
                    if elapsed_ms(now_ms, *window_start_ms) >= self.params.settle_window_ms {
                        self.start_session(weight_g, now_ms);
                        return Some(Event::WeightSettled {
                            start_weight_g: weight_g,
                        });
                    }
                } else {
                    *window_start_ms = now_ms;
                }
                *last_g = weight_g;

                if elapsed_ms(now_ms, *since_ms) >= self.params.settle_timeout_ms {
                    self.start_session(weight_g, now_ms);
                    return Some(Event::SettleTimedOut {
                        start_weight_g: weight_g,
                    });
                }
                None
            }

            Phase::Toasting(session) => {
                let termination = session.update(snapshot, now_ms)?;
                self.phase = Phase::Done(termination);
                Some(Event::ToastFinished(termination))
            }

            Phase::Done(_) => None,
        }
    }

    /// Screen for the current phase
    pub fn view(&self) -> View {
        match &self.phase {
            Phase::Placement { .. } => View::PlaceBread {
                show_frozen: self.estimate.show_frozen,
                extra_percent: self.estimate.extra_percent,
            },
            Phase::Settling { last_g, .. } => View::Calibrating { weight_g: *last_g },
            Phase::Toasting(session) => View::Toasting {
                progress: session.progress(),
            },
            Phase::Done(_) => View::ToastReady,
        }
    }

    fn start_session(&mut self, start_weight_g: f32, now_ms: u32) {
        self.phase = Phase::Toasting(ToastSession::start(
            &self.estimate,
            start_weight_g,
            self.temp_guided,
            now_ms,
            &self.params,
        ));
    }
}

fn settling(weight_g: f32, now_ms: u32) -> Phase {
    Phase::Settling {
        last_g: weight_g,
        window_start_ms: now_ms,
        since_ms: now_ms,
    }
}
