//! Bounded cyclic selection

/// Selection index in `0..N` that wraps in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclicIndex<const N: usize> {
    index: u8,
}

impl<const N: usize> CyclicIndex<N> {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    pub fn get(&self) -> usize {
        self.index as usize
    }

    /// Move one step in the direction of `delta`
    ///
    /// The magnitude is ignored: a fast spin between two ticks still
    /// moves the selection by one. Returns true if the index changed.
    pub fn step(&mut self, delta: i32) -> bool {
        let n = N as u8;
        if delta > 0 {
            self.index = (self.index + 1) % n;
        } else if delta < 0 {
            self.index = (self.index + n - 1) % n;
        } else {
            return false;
        }
        N > 1
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Result of feeding one tick of input to a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Navigation<T> {
    /// Nothing happened
    Idle,
    /// The highlighted entry changed
    Moved,
    /// The button confirmed an entry
    Selected(T),
}
