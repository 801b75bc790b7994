//! Sensor hardware configuration
//!
//! Bus addresses, multiplexer wiring and sampling periods of the
//! peripheral drivers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::calibration::COLOR_SENSOR_COUNT;

/// Default TCA9548A address
pub const MUX_ADDRESS: u8 = 0x70;

/// Sensor wiring and sampling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// I2C multiplexer address
    pub mux_address: u8,
    /// Mux channel of the IR thermometer
    pub thermometer_channel: u8,
    /// Mux channels of the colour sensors, sensor 0 first
    pub color_channels: [u8; COLOR_SENSOR_COUNT],
    /// Load-cell sampling period (ms)
    pub weight_period_ms: u32,
    /// Thermometer sampling period (ms)
    pub temperature_period_ms: u32,
    /// Colour sampling period (ms)
    pub color_period_ms: u32,
    /// Readings averaged by tare and calibrate
    pub tare_samples: u8,
    /// Readings averaged by white calibration
    pub white_samples: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            mux_address: MUX_ADDRESS,
            thermometer_channel: 0,
            color_channels: [1, 3, 4],
            weight_period_ms: 200,
            temperature_period_ms: 100,
            color_period_ms: 250,
            tare_samples: 32,
            white_samples: 16,
        }
    }
}

impl SensorConfig {
    /// Mux channel of one colour sensor
    pub fn color_channel(&self, index: usize) -> Option<u8> {
        self.color_channels.get(index).copied()
    }

    /// Check every channel exists on an 8-port mux and none is shared
    pub fn channels_valid(&self) -> bool {
        let mut used: u8 = 1 << (self.thermometer_channel & 7);
        if self.thermometer_channel > 7 {
            return false;
        }
        for &ch in &self.color_channels {
            if ch > 7 || used & (1 << ch) != 0 {
                return false;
            }
            used |= 1 << ch;
        }
        true
    }
}
