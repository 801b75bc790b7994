//! Persistent configuration

pub mod calibration;

pub use calibration::{load_calibration, save_calibration};
