//! MLX90614 non-contact IR thermometer
//!
//! SMBus word reads of the RAM temperature registers. The object reading
//! is the bread surface, the ambient reading is the sensor die.

use embedded_hal::i2c::I2c;

use crumb_core::traits::{SensorError, TemperatureSensor};

use crate::DriverError;

/// Factory default SMBus address
pub const MLX90614_ADDRESS: u8 = 0x5A;

/// RAM registers
pub mod reg {
    pub const TA: u8 = 0x06;
    pub const TOBJ1: u8 = 0x07;
}

/// Set in a RAM word when the reading is invalid
const ERROR_FLAG: u16 = 1 << 15;

/// Default sampling period (ms)
pub const DEFAULT_PERIOD_MS: u32 = 100;

/// Convert a raw RAM word (0.02 K per LSB) to °C
#[inline]
pub fn raw_to_celsius(raw: u16) -> f32 {
    raw as f32 * 0.02 - 273.15
}

/// MLX90614 driver
///
/// Both temperatures stay NaN until the first successful sample.
pub struct Mlx90614<I> {
    i2c: I,
    address: u8,
    period_ms: u32,
    last_sample_ms: Option<u32>,
    object_c: f32,
    ambient_c: f32,
    present: bool,
}

impl<I: I2c> Mlx90614<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: MLX90614_ADDRESS,
            period_ms: DEFAULT_PERIOD_MS,
            last_sample_ms: None,
            object_c: f32::NAN,
            ambient_c: f32::NAN,
            present: false,
        }
    }

    pub fn with_period(mut self, period_ms: u32) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Read one RAM word (low byte, high byte, PEC)
    pub fn read_word(&mut self, register: u8) -> Result<u16, DriverError<I::Error>> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(DriverError::I2c)?;

        let raw = u16::from_le_bytes([buf[0], buf[1]]);
        if raw & ERROR_FLAG != 0 {
            return Err(DriverError::InvalidReading);
        }
        Ok(raw)
    }

    /// Read a temperature register in °C
    pub fn read_celsius(&mut self, register: u8) -> Result<f32, DriverError<I::Error>> {
        self.read_word(register).map(raw_to_celsius)
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}

impl<I: I2c> TemperatureSensor for Mlx90614<I> {
    fn begin(&mut self) -> Result<(), SensorError> {
        self.present = false;
        let ambient = self.read_celsius(reg::TA)?;
        self.ambient_c = ambient;
        self.present = true;
        Ok(())
    }

    fn update(&mut self, now_ms: u32) {
        if !self.present {
            return;
        }
        if let Some(last) = self.last_sample_ms {
            if now_ms.wrapping_sub(last) < self.period_ms {
                return;
            }
        }
        self.last_sample_ms = Some(now_ms);

        // A failed read keeps the previous value
        if let Ok(t) = self.read_celsius(reg::TOBJ1) {
            self.object_c = t;
        }
        if let Ok(t) = self.read_celsius(reg::TA) {
            self.ambient_c = t;
        }
    }

    fn object_c(&self) -> f32 {
        self.object_c
    }

    fn ambient_c(&self) -> f32 {
        self.ambient_c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MuxChannel, MUX_ADDRESS};
    use crate::sensor::mock::MockBus;

    /// Raw word for a temperature in °C
    fn word(celsius: f32) -> u16 {
        ((celsius + 273.15) / 0.02 + 0.5) as u16
    }

    fn close(a: f32, b: f32) -> bool {
        crate::abs(a - b) < 0.02
    }

    #[test]
    fn test_conversion() {
        assert!(close(raw_to_celsius(0x3AF7), 28.75));
        assert!(close(raw_to_celsius(13_658), 0.01));
    }

    #[test]
    fn test_starts_as_nan() {
        let mut bus = MockBus::new();
        let thermo = Mlx90614::new(&mut bus);
        assert!(thermo.object_c().is_nan());
        assert!(thermo.ambient_c().is_nan());
    }

    #[test]
    fn test_reads_behind_mux() {
        let mut bus = MockBus::new();
        bus.add_mlx90614(0x01);
        bus.set_mlx_word(0x01, reg::TA, word(22.0));
        bus.set_mlx_word(0x01, reg::TOBJ1, word(95.5));

        let mut thermo = Mlx90614::new(MuxChannel::new(&mut bus, MUX_ADDRESS, 0));
        assert_eq!(thermo.begin(), Ok(()));
        assert!(close(thermo.ambient_c(), 22.0));
        assert!(thermo.object_c().is_nan());

        thermo.update(0);
        assert!(close(thermo.object_c(), 95.5));
        drop(thermo);
        assert_eq!(bus.last_mux_mask(), Some(0x01));
    }

    #[test]
    fn test_update_self_throttles() {
        let mut bus = MockBus::new();
        bus.add_mlx90614(0);
        bus.set_mlx_word(0, reg::TA, word(20.0));
        bus.set_mlx_word(0, reg::TOBJ1, word(20.0));

        let mut thermo = Mlx90614::new(bus);
        assert_eq!(thermo.begin(), Ok(()));
        thermo.update(1_000);
        assert!(close(thermo.object_c(), 20.0));

        thermo.i2c.set_mlx_word(0, reg::TOBJ1, word(60.0));
        thermo.update(1_050);
        assert!(close(thermo.object_c(), 20.0));
        thermo.update(1_100);
        assert!(close(thermo.object_c(), 60.0));
    }

    #[test]
    fn test_error_flag_rejected() {
        let mut bus = MockBus::new();
        bus.add_mlx90614(0);
        bus.set_mlx_word(0, reg::TA, 0x8000 | 100);
        let mut thermo = Mlx90614::new(&mut bus);
        assert_eq!(thermo.begin(), Err(SensorError::InvalidReading));
        assert!(!thermo.is_present());
    }

    #[test]
    fn test_missing_device() {
        let mut bus = MockBus::new();
        let mut thermo = Mlx90614::new(&mut bus);
        assert_eq!(thermo.begin(), Err(SensorError::Bus));
        thermo.update(0);
        assert!(thermo.object_c().is_nan());
    }
}
