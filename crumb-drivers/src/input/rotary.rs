//! Rotary encoder with push button
//!
//! Encoder edges are decoded elsewhere (interrupt or edge-wait task) into
//! a shared [`EncoderCounter`]; this side drains the counter and
//! debounces the active-low push button.

use embedded_hal::digital::InputPin;

use crumb_core::input::{ButtonDebouncer, EncoderCounter};
use crumb_core::traits::InputSource;

pub struct RotaryInput<'a, P> {
    counter: &'a EncoderCounter,
    button: P,
    debouncer: ButtonDebouncer,
}

impl<'a, P: InputPin> RotaryInput<'a, P> {
    pub fn new(counter: &'a EncoderCounter, button: P) -> Self {
        Self {
            counter,
            button,
            debouncer: ButtonDebouncer::new(),
        }
    }

    /// Unreadable pins count as released
    fn level(&mut self) -> bool {
        self.button.is_low().unwrap_or(false)
    }
}

impl<P: InputPin> InputSource for RotaryInput<'_, P> {
    fn encoder_delta(&mut self) -> i32 {
        self.counter.take()
    }

    fn button_pressed(&mut self, now_ms: u32) -> bool {
        let held = self.level();
        self.debouncer.update(held, now_ms);
        self.debouncer.take_press()
    }

    fn button_held(&mut self) -> bool {
        self.level()
    }

    fn reset(&mut self) {
        self.counter.take();
        self.debouncer.clear();
    }
}
