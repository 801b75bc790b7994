//! Confirmation dialog shown before toasting

use crate::config::ConfirmKind;

use super::selector::{CyclicIndex, Navigation};
use super::view::Question;

/// What the user chose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Answer {
    /// Back to the menu without toasting
    Cancel,
    /// Toast until the weight target only
    WeightOnly,
    /// Toast with the temperature hold as a second stop criterion
    TemperatureGuided,
}

impl Answer {
    /// True if this answer starts a toast session
    pub fn starts_toast(&self) -> bool {
        !matches!(self, Answer::Cancel)
    }

    pub fn temperature_guided(&self) -> bool {
        matches!(self, Answer::TemperatureGuided)
    }
}

/// Binary yes/no dialog
///
/// The highlighted option always starts at index 0. Which answer each
/// index means depends on the [`ConfirmKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfirmDialog {
    kind: ConfirmKind,
    selection: CyclicIndex<2>,
}

impl ConfirmDialog {
    pub const fn new(kind: ConfirmKind) -> Self {
        Self {
            kind,
            selection: CyclicIndex::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.selection.get()
    }

    pub fn question(&self) -> Question {
        match self.kind {
            ConfirmKind::StartToasting => Question::StartToasting,
            ConfirmKind::TemperatureJig => Question::TemperatureJig,
        }
    }

    /// Answer represented by an option index
    pub fn answer_at(&self, index: usize) -> Answer {
        match (self.kind, index) {
            // [No, Yes]
            (ConfirmKind::StartToasting, 0) => Answer::Cancel,
            (ConfirmKind::StartToasting, _) => Answer::WeightOnly,
            // [Yes, No]
            (ConfirmKind::TemperatureJig, 0) => Answer::TemperatureGuided,
            (ConfirmKind::TemperatureJig, _) => Answer::WeightOnly,
        }
    }

    /// Apply one tick of input
    pub fn handle(&mut self, delta: i32, pressed: bool) -> Navigation<Answer> {
        let moved = self.selection.step(delta);

        if pressed {
            return Navigation::Selected(self.answer_at(self.selection.get()));
        }

        if moved {
            Navigation::Moved
        } else {
            Navigation::Idle
        }
    }
}
