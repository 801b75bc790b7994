//! Embassy async tasks
//!
//! The controller task owns every peripheral on the I2C bus plus the
//! heater. The others feed it through the statics in `channels`.

pub mod calibration;
pub mod console;
pub mod controller;
pub mod encoder;

pub use calibration::calibration_task;
pub use console::console_task;
pub use controller::{controller_task, Toaster};
pub use encoder::encoder_task;
