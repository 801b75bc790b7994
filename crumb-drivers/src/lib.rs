//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in crumb-core for the toaster's peripherals:
//!
//! - I2C multiplexer (TCA9548A) channel handles
//! - Load cell (NAU7802 ADC) with tare and calibration
//! - IR thermometer (MLX90614)
//! - Colour sensor array (TCS34725)
//! - GPIO heater output
//! - Rotary encoder with push button

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod error;
pub mod heater;
pub mod input;
pub mod sensor;

pub use error::DriverError;

/// `f32::abs` without std
pub(crate) fn abs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}
