//! Main menu

use super::selector::{CyclicIndex, Navigation};

/// Operating modes offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Toast,
    Sensors,
    Logo,
}

impl Mode {
    pub const COUNT: usize = 3;

    /// Menu entries in display order
    pub const ALL: [Mode; Self::COUNT] = [Mode::Toast, Mode::Sensors, Mode::Logo];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Toast => "Toast",
            Mode::Sensors => "Sensors",
            Mode::Logo => "Logo",
        }
    }
}

/// Mode selection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MainMenu {
    selection: CyclicIndex<{ Mode::COUNT }>,
}

impl MainMenu {
    pub const fn new() -> Self {
        Self {
            selection: CyclicIndex::new(),
        }
    }

    /// Highlighted entry
    pub fn index(&self) -> usize {
        self.selection.get()
    }

    /// Back to the first entry
    pub fn reset(&mut self) {
        self.selection.reset();
    }

    /// Apply one tick of input
    ///
    /// Rotation is applied before the press, so a press in the same tick
    /// selects the entry the knob just moved to.
    pub fn handle(&mut self, delta: i32, pressed: bool) -> Navigation<Mode> {
        let moved = self.selection.step(delta);

        if pressed {
            if let Some(mode) = Mode::from_index(self.selection.get()) {
                return Navigation::Selected(mode);
            }
        }

        if moved {
            Navigation::Moved
        } else {
            Navigation::Idle
        }
    }
}
