//! Sensor aggregation
//!
//! Individual drivers are combined behind [`SensorHub`], which the
//! controller polls once per tick and reads back as a single
//! [`SensorSnapshot`].

pub mod color;
pub mod hub;
pub mod snapshot;

pub use color::ColorReading;
pub use hub::{BeginReport, SensorHub};
pub use snapshot::SensorSnapshot;
