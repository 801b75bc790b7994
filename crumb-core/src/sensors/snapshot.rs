//! Per-tick sensor snapshot

/// Latest values of every sensor, captured in one go
///
/// The colour fields come from colour sensor 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSnapshot {
    /// Bread surface temperature (°C)
    pub temperature_c: f32,
    /// Net weight on the scale (g)
    pub weight_g: f32,
    /// Normalized 8-bit colour
    pub color: (u8, u8, u8),
    /// Clear channel relative to the white reference, 0..=1
    pub brightness: f32,
}

impl SensorSnapshot {
    /// Build a snapshot from scalar readings
    pub const fn new(temperature_c: f32, weight_g: f32) -> Self {
        Self {
            temperature_c,
            weight_g,
            color: (0, 0, 0),
            brightness: 0.0,
        }
    }
}
