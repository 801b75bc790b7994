//! State machine definition
//!
//! Heater and UI behavior is a function of the current state and an
//! event.

use super::events::Event;
use crate::ui::Mode;

/// Appliance states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Display and sensor bring-up, splash
    Boot,
    /// Mode selection
    Menu,
    /// Toast confirmation dialog
    Confirm,
    /// Waiting for bread on the scale
    PlaceBread,
    /// Waiting for the weight to settle
    Settling,
    /// Heater on
    Toasting,
    /// Toast done, waiting for a press
    Ready,
    /// Live sensor readout
    Sensors,
    /// Logo screen
    Logo,
    /// Display missing; nothing can be operated
    Halted,
}

impl State {
    /// Check if this state allows heater operation
    pub fn heater_allowed(&self) -> bool {
        matches!(self, State::Toasting)
    }

    /// Check if this state belongs to a toast run
    pub fn is_toasting_flow(&self) -> bool {
        matches!(
            self,
            State::PlaceBread | State::Settling | State::Toasting
        )
    }

    /// Check if maintenance commands may run in this state
    pub fn accepts_calibration(&self) -> bool {
        matches!(self, State::Menu)
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Boot transitions
            (Boot, DisplayInitFailed) => Halted,
            (Boot, BootComplete) => Menu,

            // Menu transitions
            (Menu, ModeSelected(Mode::Toast)) => Confirm,
            (Menu, ModeSelected(Mode::Sensors)) => Sensors,
            (Menu, ModeSelected(Mode::Logo)) => Logo,

            // Confirm transitions
            (Confirm, ToastConfirmed { .. }) => PlaceBread,
            (Confirm, ToastCancelled) => Menu,

            // Toast flow transitions
            (PlaceBread, BreadPlaced { .. }) => Settling,
            (PlaceBread, PlacementTimedOut { .. }) => Settling,
            (Settling, WeightSettled { .. }) => Toasting,
            (Settling, SettleTimedOut { .. }) => Toasting,
            (Toasting, ToastFinished(_)) => Ready,

            // Screens that wait for a press
            (Ready, Dismissed) => Menu,
            (Sensors, Dismissed) => Menu,
            (Logo, Dismissed) => Menu,

            // Default: stay in current state
            _ => self,
        }
    }
}
