//! Push-button debouncing

use crate::elapsed_ms;

/// Level must hold this long before it is accepted (ms)
pub const DEBOUNCE_MS: u32 = 20;

/// Debouncer with a latched press edge
///
/// Feed raw levels with [`update`](Self::update). A press is latched on
/// the debounced released-to-held transition and stays latched until
/// [`take_press`](Self::take_press) observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonDebouncer {
    raw: bool,
    stable: bool,
    changed_at_ms: u32,
    latched: bool,
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonDebouncer {
    pub const fn new() -> Self {
        Self {
            raw: false,
            stable: false,
            changed_at_ms: 0,
            latched: false,
        }
    }

    /// Process a raw sample (`held` is true while the button is down)
    pub fn update(&mut self, held: bool, now_ms: u32) {
        if held != self.raw {
            self.raw = held;
            self.changed_at_ms = now_ms;
            return;
        }

        if self.raw != self.stable && elapsed_ms(now_ms, self.changed_at_ms) >= DEBOUNCE_MS {
            self.stable = self.raw;
            if self.stable {
                self.latched = true;
            }
        }
    }

    /// Consume the latched press
    pub fn take_press(&mut self) -> bool {
        core::mem::replace(&mut self.latched, false)
    }

    /// Debounced level
    pub fn is_held(&self) -> bool {
        self.stable
    }

    /// Drop any latched press
    pub fn clear(&mut self) {
        self.latched = false;
    }
}
