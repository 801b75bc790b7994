//! NAU7802 24-bit load-cell ADC
//!
//! Register-level driver: reset, power-up, LDO and PGA setup, internal
//! offset calibration and raw conversion reads. Scaling to grams lives
//! in [`LoadCell`](super::load_cell::LoadCell).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::load_cell::LoadCellAdc;
use crate::DriverError;

/// Fixed I2C address
pub const NAU7802_ADDRESS: u8 = 0x2A;

/// Register addresses
pub mod reg {
    /// Power-up control
    pub const PU_CTRL: u8 = 0x00;
    /// Gain and LDO voltage
    pub const CTRL1: u8 = 0x01;
    /// Calibration and sample rate
    pub const CTRL2: u8 = 0x02;
    /// Conversion result, MSB first
    pub const ADCO_B2: u8 = 0x12;
    /// ADC control
    pub const ADC: u8 = 0x15;
    /// PGA power
    pub const POWER: u8 = 0x1C;
}

/// PU_CTRL bits
pub mod pu {
    pub const RR: u8 = 1 << 0;
    pub const PUD: u8 = 1 << 1;
    pub const PUA: u8 = 1 << 2;
    pub const PUR: u8 = 1 << 3;
    pub const CS: u8 = 1 << 4;
    pub const CR: u8 = 1 << 5;
    pub const AVDDS: u8 = 1 << 7;
}

const CTRL2_CALS: u8 = 1 << 2;
const CTRL2_CAL_ERR: u8 = 1 << 3;
const POWER_PGA_CAP_EN: u8 = 1 << 7;
/// Disable the ADC clock chopper (REG_CHPS = 0b11)
const ADC_CHPS_OFF: u8 = 0b11 << 4;

const POWER_UP_TIMEOUT_MS: u32 = 200;
const CALIBRATION_TIMEOUT_MS: u32 = 1_000;

/// PGA gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1 = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
    X32 = 0b101,
    X64 = 0b110,
    X128 = 0b111,
}

/// Conversion rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    Sps10 = 0b000,
    Sps20 = 0b001,
    Sps40 = 0b010,
    Sps80 = 0b011,
    Sps320 = 0b111,
}

/// Internal LDO output voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ldo {
    V2_4 = 0b111,
    V2_7 = 0b110,
    V3_0 = 0b101,
    V3_3 = 0b100,
    V3_6 = 0b011,
    V4_5 = 0b000,
}

/// NAU7802 driver
pub struct Nau7802<I> {
    i2c: I,
    gain: Gain,
    rate: SampleRate,
    ldo: Ldo,
}

impl<I: I2c> Nau7802<I> {
    /// Driver with the load-cell defaults: 3.3 V LDO, gain 128, 10 SPS
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            gain: Gain::X128,
            rate: SampleRate::Sps10,
            ldo: Ldo::V3_3,
        }
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_sample_rate(mut self, rate: SampleRate) -> Self {
        self.rate = rate;
        self
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, DriverError<I::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(NAU7802_ADDRESS, &[reg], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), DriverError<I::Error>> {
        self.i2c
            .write(NAU7802_ADDRESS, &[reg, value])
            .map_err(DriverError::I2c)
    }

    fn modify_reg(
        &mut self,
        reg: u8,
        clear: u8,
        set: u8,
    ) -> Result<(), DriverError<I::Error>> {
        let value = self.read_reg(reg)?;
        self.write_reg(reg, (value & !clear) | set)
    }

    /// Reset all registers
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::PU_CTRL, 0, pu::RR)?;
        delay.delay_ms(1);
        self.modify_reg(reg::PU_CTRL, pu::RR, 0)
    }

    /// Power up digital and analog sections and wait for ready
    pub fn power_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::PU_CTRL, 0, pu::PUD | pu::PUA)?;
        for _ in 0..POWER_UP_TIMEOUT_MS {
            if self.read_reg(reg::PU_CTRL)? & pu::PUR != 0 {
                return Ok(());
            }
            delay.delay_ms(1);
        }
        Err(DriverError::Timeout)
    }

    pub fn set_ldo(&mut self, ldo: Ldo) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::CTRL1, 0b111 << 3, (ldo as u8) << 3)?;
        self.modify_reg(reg::PU_CTRL, 0, pu::AVDDS)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::CTRL1, 0b111, gain as u8)
    }

    pub fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::CTRL2, 0b111 << 4, (rate as u8) << 4)
    }

    /// Run the internal offset calibration
    pub fn calibrate_afe<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), DriverError<I::Error>> {
        self.modify_reg(reg::CTRL2, 0, CTRL2_CALS)?;
        for _ in 0..CALIBRATION_TIMEOUT_MS {
            let ctrl2 = self.read_reg(reg::CTRL2)?;
            if ctrl2 & CTRL2_CALS == 0 {
                if ctrl2 & CTRL2_CAL_ERR != 0 {
                    return Err(DriverError::InvalidReading);
                }
                return Ok(());
            }
            delay.delay_ms(1);
        }
        Err(DriverError::Timeout)
    }
}

impl<I: I2c> LoadCellAdc for Nau7802<I> {
    type Error = I::Error;

    fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<Self::Error>> {
        self.reset(delay)?;
        self.power_up(delay)?;
        self.set_ldo(self.ldo)?;
        self.set_gain(self.gain)?;
        self.set_sample_rate(self.rate)?;
        self.modify_reg(reg::ADC, 0, ADC_CHPS_OFF)?;
        self.modify_reg(reg::POWER, 0, POWER_PGA_CAP_EN)?;
        self.calibrate_afe(delay)?;
        self.modify_reg(reg::PU_CTRL, 0, pu::CS)
    }

    fn data_ready(&mut self) -> Result<bool, DriverError<Self::Error>> {
        Ok(self.read_reg(reg::PU_CTRL)? & pu::CR != 0)
    }

    fn read_raw(&mut self) -> Result<i32, DriverError<Self::Error>> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(NAU7802_ADDRESS, &[reg::ADCO_B2], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(sign_extend_24(buf))
    }
}

/// Interpret three big-endian bytes as a signed 24-bit value
pub fn sign_extend_24(bytes: [u8; 3]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::{MockBus, NoDelay};

    #[test]
    fn test_sign_extension() {
        assert_eq!(sign_extend_24([0x00, 0x00, 0x01]), 1);
        assert_eq!(sign_extend_24([0x7F, 0xFF, 0xFF]), 8_388_607);
        assert_eq!(sign_extend_24([0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(sign_extend_24([0x80, 0x00, 0x00]), -8_388_608);
    }

    #[test]
    fn test_init_configures_device() {
        let mut bus = MockBus::new();
        bus.add_nau7802();
        let mut adc = Nau7802::new(&mut bus);
        assert!(adc.init(&mut NoDelay).is_ok());

        let pu_ctrl = bus.nau_reg(reg::PU_CTRL);
        assert_ne!(pu_ctrl & pu::PUD, 0);
        assert_ne!(pu_ctrl & pu::PUA, 0);
        assert_ne!(pu_ctrl & pu::AVDDS, 0);
        assert_ne!(pu_ctrl & pu::CS, 0);
        assert_eq!(pu_ctrl & pu::RR, 0);

        // LDO 3.3 V, gain 128
        assert_eq!(bus.nau_reg(reg::CTRL1), (0b100 << 3) | 0b111);
        // 10 SPS, calibration finished
        assert_eq!(bus.nau_reg(reg::CTRL2) & (0b111 << 4), 0);
        assert_eq!(bus.nau_reg(reg::CTRL2) & CTRL2_CALS, 0);
    }

    #[test]
    fn test_missing_device() {
        let mut bus = MockBus::new();
        let mut adc = Nau7802::new(&mut bus);
        assert!(matches!(adc.init(&mut NoDelay), Err(DriverError::I2c(_))));
    }

    #[test]
    fn test_conversion_read() {
        let mut bus = MockBus::new();
        bus.add_nau7802();
        bus.set_adc(-12_345);
        let mut adc = Nau7802::new(&mut bus);
        assert_eq!(adc.data_ready(), Ok(true));
        assert_eq!(adc.read_raw(), Ok(-12_345));
    }
}
