//! User input trait

/// Rotary encoder with push button
pub trait InputSource {
    /// Signed encoder ticks accumulated since the previous call
    ///
    /// Reading resets the accumulator.
    fn encoder_delta(&mut self) -> i32;

    /// One-shot debounced press edge
    ///
    /// Returns true at most once per physical press; the latch is cleared
    /// by the call that observes it.
    fn button_pressed(&mut self, now_ms: u32) -> bool;

    /// Live button level (true while held down)
    fn button_held(&mut self) -> bool;

    /// Discard accumulated encoder ticks and any latched press
    fn reset(&mut self);
}
