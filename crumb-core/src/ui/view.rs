//! Screens the controller can ask the display to draw

use crate::sensors::SensorSnapshot;

use super::menu::Mode;

/// Confirmation dialog prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Question {
    StartToasting,
    TemperatureJig,
}

impl Question {
    pub fn text(&self) -> &'static str {
        match self {
            Question::StartToasting => "Start toasting?",
            Question::TemperatureJig => "Temp jig set up?",
        }
    }

    /// Option labels by dialog index
    pub fn options(&self) -> [&'static str; 2] {
        match self {
            Question::StartToasting => ["No", "Yes"],
            Question::TemperatureJig => ["Yes", "No"],
        }
    }
}

/// A complete screen description
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    /// Logo
    Splash,
    /// Boot failure notice
    InitError,
    /// Main menu with the highlighted entry
    ModeSelection { selected: Mode },
    /// Live sensor readout
    SensorShowcase(SensorSnapshot),
    /// Confirmation dialog with the highlighted option index
    YesNo { question: Question, index: u8 },
    /// Waiting for bread on the scale
    PlaceBread { show_frozen: bool, extra_percent: f32 },
    /// Waiting for the weight to settle
    Calibrating { weight_g: f32 },
    /// Heating, progress in 0..=1
    Toasting { progress: f32 },
    /// Done, waiting for a press
    ToastReady,
}

impl View {
    /// Progress bar fill in percent, if the view has one
    pub fn progress_percent(&self) -> Option<u8> {
        match self {
            View::Toasting { progress } => {
                let pct = progress.clamp(0.0, 1.0) * 100.0 + 0.5;
                Some(pct as u8)
            }
            _ => None,
        }
    }
}
