//! Driver error type

use crumb_core::traits::SensorError;

/// Errors returned by the peripheral drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// Underlying bus error
    I2c(E),
    /// Device reported an unexpected ID
    NotFound,
    /// Device flagged the measurement as invalid
    InvalidReading,
    /// Device did not become ready in time
    Timeout,
}

impl<E> From<DriverError<E>> for SensorError {
    fn from(err: DriverError<E>) -> Self {
        match err {
            DriverError::I2c(_) => SensorError::Bus,
            DriverError::NotFound => SensorError::NotFound,
            DriverError::InvalidReading => SensorError::InvalidReading,
            DriverError::Timeout => SensorError::Timeout,
        }
    }
}
