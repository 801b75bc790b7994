//! Quadrature decoding

use portable_atomic::{AtomicI32, Ordering};

/// Encoder tick accumulator shared between the edge handler and the
/// controller
///
/// The edge handler is the only writer; the controller drains it with
/// [`take`](Self::take).
pub struct EncoderCounter {
    ticks: AtomicI32,
}

impl Default for EncoderCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderCounter {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicI32::new(0),
        }
    }

    /// Record one decoded step (+1, -1 or 0)
    #[inline]
    pub fn step(&self, direction: i8) {
        if direction != 0 {
            self.ticks.fetch_add(direction as i32, Ordering::Release);
        }
    }

    /// Read and reset the accumulated ticks
    #[inline]
    pub fn take(&self) -> i32 {
        self.ticks.swap(0, Ordering::AcqRel)
    }
}

/// Channel-A edge decoder
///
/// Every change of A is one step; B at that moment gives the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    last_a: bool,
}

impl QuadratureDecoder {
    pub const fn new(initial_a: bool) -> Self {
        Self { last_a: initial_a }
    }

    /// Feed the current pin levels, returns the step direction
    pub fn decode(&mut self, a: bool, b: bool) -> i8 {
        if a == self.last_a {
            return 0;
        }
        self.last_a = a;
        if a == b {
            1
        } else {
            -1
        }
    }
}
