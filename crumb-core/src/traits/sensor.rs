//! Sensor traits
//!
//! Each physical sensor family gets its own trait. Implementations own
//! their smoothing, deadbanding and self-throttling: `update` may be
//! called as often as the caller likes and only touches the bus once the
//! device's own period has elapsed.

use crate::config::{CalibrationCommand, CalibrationData};
use crate::sensors::{BeginReport, ColorReading, SensorSnapshot};

/// Errors that can occur while talking to a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not acknowledge or reported an unexpected ID
    NotFound,
    /// Bus transaction failed
    Bus,
    /// Device flagged the reading as invalid
    InvalidReading,
    /// No conversion became ready in time
    Timeout,
    /// Argument rejected (non-positive mass, out-of-range index, ...)
    InvalidArgument,
    /// Operation not supported by this implementation
    Unsupported,
}

/// Load cell returning grams
pub trait WeightSensor {
    /// Probe and configure the device, then tare
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Take a new sample if the sampling period has elapsed
    fn update(&mut self, now_ms: u32);

    /// Smoothed net weight in grams
    fn weight_g(&self) -> f32;

    /// Re-zero the scale on the current load
    fn tare(&mut self) -> Result<(), SensorError>;

    /// Derive counts-per-gram from a known mass placed on the scale
    fn calibrate(&mut self, known_mass_g: f32) -> Result<(), SensorError>;

    /// Set counts-per-gram directly (ignored if not positive)
    fn set_counts_per_gram(&mut self, counts_per_gram: f32);

    /// Remember the current weight as the delta baseline
    fn set_baseline_to_current(&mut self);

    /// Current counts-per-gram factor
    fn counts_per_gram(&self) -> f32;

    /// Current zero offset in raw counts
    fn zero_offset(&self) -> i32;
}

/// Non-contact thermometer
pub trait TemperatureSensor {
    /// Probe the device
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Take a new sample if the sampling period has elapsed
    fn update(&mut self, now_ms: u32);

    /// Object (bread surface) temperature in °C
    fn object_c(&self) -> f32;

    /// Sensor die temperature in °C
    fn ambient_c(&self) -> f32;
}

/// Array of colour sensors
pub trait ColorSensor {
    /// Probe every sensor in the array
    ///
    /// Returns an error if any of them is missing; the ones that responded
    /// are still usable.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Refresh all sensors if the sampling period has elapsed
    fn update(&mut self, now_ms: u32);

    /// Latest reading of one sensor
    fn reading(&self, index: usize) -> Option<ColorReading>;

    /// Average the clear channel over a white target and store it as the
    /// white reference. Returns the stored reference.
    fn calibrate_white(&mut self, index: usize, samples: u16) -> Result<u16, SensorError>;

    /// Override the white reference of one sensor (ignored if below 10)
    fn set_white_reference(&mut self, index: usize, reference: u16);

    /// White reference of one sensor
    fn white_reference(&self, index: usize) -> u16;
}

/// Everything the controller needs from the sensor side
pub trait SensorSource {
    /// Bring up every device, reporting per-device success
    fn begin_all(&mut self) -> BeginReport;

    /// Refresh all devices (each self-throttles)
    fn poll_all(&mut self, now_ms: u32);

    /// Latest cached values as one immutable snapshot
    fn snapshot(&self) -> SensorSnapshot;

    /// Apply persisted calibration before `begin_all`
    fn restore_calibration(&mut self, _data: &CalibrationData) {}

    /// Execute a maintenance calibration command
    fn apply_calibration(&mut self, _command: CalibrationCommand) -> Result<(), SensorError> {
        Err(SensorError::Unsupported)
    }

    /// Current calibration constants, ready to persist
    fn calibration(&self) -> CalibrationData {
        CalibrationData::new()
    }
}

