//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic
//! and hardware-specific implementations. The controller only ever
//! sees these traits, so tests can drive it with simulated sensors.

pub mod display;
pub mod heater;
pub mod input;
pub mod sensor;

pub use display::DisplaySink;
pub use heater::HeaterOutput;
pub use input::InputSource;
pub use sensor::{ColorSensor, SensorError, SensorSource, TemperatureSensor, WeightSensor};
