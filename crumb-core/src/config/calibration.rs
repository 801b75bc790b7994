//! Calibration data types
//!
//! Load-cell and colour-sensor calibration constants. They are produced
//! by the drivers, persisted to flash by the firmware and handed back to
//! the drivers on boot. The controller only ever passes them through.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signature byte marking initialized calibration storage
pub const CALIBRATION_SIGNATURE: u8 = 0x5A;

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Number of colour sensors behind the multiplexer
pub const COLOR_SENSOR_COUNT: usize = 3;

/// Counts-per-gram used until the scale has been calibrated
pub const DEFAULT_COUNTS_PER_GRAM: f32 = 700.0;

/// Clear-channel white reference used until a white calibration ran
pub const DEFAULT_WHITE_REFERENCE: u16 = 1200;

/// Smallest accepted white reference
pub const MIN_WHITE_REFERENCE: u16 = 10;

/// Reference mass used by the maintenance calibration command
pub const KNOWN_MASS_G: f32 = 200.0;

/// Calibration constants persisted across boots
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationData {
    /// Must equal [`CALIBRATION_SIGNATURE`]
    pub signature: u8,
    /// Data format version
    pub version: u8,
    /// Raw load-cell counts per gram
    pub counts_per_gram: f32,
    /// Raw load-cell reading with nothing on the scale
    pub zero_offset: i32,
    /// Clear-channel white reference per colour sensor
    pub white_reference: [u16; COLOR_SENSOR_COUNT],
    /// CRC32 over every field above
    pub crc: u32,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationData {
    /// Factory defaults
    pub const fn new() -> Self {
        Self {
            signature: CALIBRATION_SIGNATURE,
            version: CALIBRATION_VERSION,
            counts_per_gram: DEFAULT_COUNTS_PER_GRAM,
            zero_offset: 0,
            white_reference: [DEFAULT_WHITE_REFERENCE; COLOR_SENSOR_COUNT],
            crc: 0,
        }
    }

    /// Check signature, version and value ranges
    pub fn is_valid(&self) -> bool {
        self.signature == CALIBRATION_SIGNATURE
            && self.version == CALIBRATION_VERSION
            && self.counts_per_gram.is_finite()
            && self.counts_per_gram > 0.0
            && self
                .white_reference
                .iter()
                .all(|&c| c >= MIN_WHITE_REFERENCE && c < u16::MAX)
    }

    /// Calculate CRC32 over the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &[self.signature, self.version]);
        crc = crc32_update(crc, &self.counts_per_gram.to_bits().to_le_bytes());
        crc = crc32_update(crc, &self.zero_offset.to_le_bytes());
        for reference in &self.white_reference {
            crc = crc32_update(crc, &reference.to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// Maintenance commands that change calibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationCommand {
    /// Re-zero the scale
    Tare,
    /// Compute counts-per-gram with a known mass on the scale
    Calibrate { known_mass_g: f32 },
    /// Use the current weight as the delta baseline
    SetBaseline,
    /// Capture the white reference of one colour sensor
    CalibrateWhite { sensor: u8 },
}

impl CalibrationCommand {
    /// Parse a single-character console command
    ///
    /// `t` tare, `c` calibrate with [`KNOWN_MASS_G`], `b` baseline,
    /// `w` white-calibrate sensor 0.
    pub fn from_console_byte(byte: u8) -> Option<Self> {
        match byte {
            b't' => Some(Self::Tare),
            b'c' => Some(Self::Calibrate {
                known_mass_g: KNOWN_MASS_G,
            }),
            b'b' => Some(Self::SetBaseline),
            b'w' => Some(Self::CalibrateWhite { sensor: 0 }),
            _ => None,
        }
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
