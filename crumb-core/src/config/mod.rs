//! Configuration types
//!
//! Board-agnostic parameters and the calibration record persisted to
//! flash as postcard binary data.

pub mod calibration;
pub mod hardware;
pub mod params;

pub use calibration::*;
pub use hardware::*;
pub use params::*;
