//! Events that trigger state transitions
//!
//! The controller returns every event it acts on so the firmware can
//! log it and react (e.g. persist calibration).

use crate::config::CalibrationCommand;
use crate::sensors::BeginReport;
use crate::toast::Termination;
use crate::ui::Mode;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Display did not respond at boot
    DisplayInitFailed,
    /// Peripherals were probed, with per-device results
    SensorsStarted(BeginReport),
    /// Splash finished
    BootComplete,

    // UI navigation events
    /// User picked a menu entry
    ModeSelected(Mode),
    /// User confirmed toasting
    ToastConfirmed { temperature_guided: bool },
    /// User declined toasting
    ToastCancelled,
    /// User left a screen that only waits for a press
    Dismissed,

    // Toast flow events
    /// Weight moved away from the baseline
    BreadPlaced { weight_g: f32 },
    /// Nothing was placed in time; continuing with the current weight
    PlacementTimedOut { weight_g: f32 },
    /// Weight held still for the stability window; heater on
    WeightSettled { start_weight_g: f32 },
    /// Weight never held still; heater on with the current weight
    SettleTimedOut { start_weight_g: f32 },
    /// Heater off
    ToastFinished(Termination),

    // Maintenance events
    /// A calibration command succeeded and new constants are available
    CalibrationChanged(CalibrationCommand),
}

impl Event {
    /// Check if this event is user-initiated
    ///
    /// User events are caused by a button press, so the state they lead
    /// to is entered only once the button is released.
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::ModeSelected(_)
                | Event::ToastConfirmed { .. }
                | Event::ToastCancelled
                | Event::Dismissed
        )
    }

    /// Check if this event starts heating
    pub fn starts_heating(&self) -> bool {
        matches!(
            self,
            Event::WeightSettled { .. } | Event::SettleTimedOut { .. }
        )
    }

    /// Check if this event reports a fallback path
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Event::PlacementTimedOut { .. }
                | Event::SettleTimedOut { .. }
                | Event::ToastFinished(Termination::FailSafe)
        )
    }
}
