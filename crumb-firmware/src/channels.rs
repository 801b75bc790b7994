//! Inter-task communication
//!
//! Static embassy-sync primitives shared between tasks. The controller
//! task owns every peripheral; the other tasks only talk to it through
//! these.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crumb_core::config::{CalibrationCommand, CalibrationData};
use crumb_core::controller::CalibrationError;
use crumb_core::input::EncoderCounter;

const CALIBRATION_CMD_SIZE: usize = 4;

/// Encoder ticks (producer: encoder task, consumer: controller)
pub static ENCODER: EncoderCounter = EncoderCounter::new();

/// Maintenance commands from the serial console
pub static CALIBRATION_CMD: Channel<CriticalSectionRawMutex, CalibrationCommand, CALIBRATION_CMD_SIZE> =
    Channel::new();

/// Outcome of the last console command, for the console's reply
pub static CALIBRATION_RESULT: Signal<CriticalSectionRawMutex, Result<(), CalibrationError>> =
    Signal::new();

/// Calibration to persist (latest value wins)
pub static CALIBRATION_SAVE: Signal<CriticalSectionRawMutex, CalibrationData> = Signal::new();
