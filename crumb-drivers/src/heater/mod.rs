//! Heating element output

pub mod gpio;

pub use gpio::GpioHeater;
