//! TCS34725 RGBC colour sensor
//!
//! Three of these share address 0x29, so in practice each one is handed a
//! [`MuxChannel`](crate::bus::MuxChannel) for its port.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::DriverError;

/// Fixed I2C address
pub const TCS34725_ADDRESS: u8 = 0x29;

/// Command bit, set on every register access
const COMMAND: u8 = 0x80;
/// Auto-increment protocol for block reads
const AUTO_INCREMENT: u8 = 0x20;

pub mod reg {
    pub const ENABLE: u8 = 0x00;
    pub const ATIME: u8 = 0x01;
    pub const CONTROL: u8 = 0x0F;
    pub const ID: u8 = 0x12;
    pub const CDATAL: u8 = 0x14;
}

const ENABLE_PON: u8 = 1 << 0;
const ENABLE_AEN: u8 = 1 << 1;

/// IDs reported by the TCS3472x family
const KNOWN_IDS: [u8; 3] = [0x44, 0x4D, 0x10];

/// Integration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms2_4 = 0xFF,
    Ms24 = 0xF6,
    Ms50 = 0xEB,
    Ms101 = 0xD5,
    Ms154 = 0xC0,
    Ms614 = 0x00,
}

/// Analog gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1 = 0b00,
    X4 = 0b01,
    X16 = 0b10,
    X60 = 0b11,
}

/// One raw RGBC sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawColor {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub c: u16,
}

pub struct Tcs34725<I> {
    i2c: I,
    integration: IntegrationTime,
    gain: Gain,
}

impl<I: I2c> Tcs34725<I> {
    /// Driver with the slowest integration and unity gain
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            integration: IntegrationTime::Ms614,
            gain: Gain::X1,
        }
    }

    pub fn with_integration(mut self, integration: IntegrationTime) -> Self {
        self.integration = integration;
        self
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), DriverError<I::Error>> {
        self.i2c
            .write(TCS34725_ADDRESS, &[COMMAND | register, value])
            .map_err(DriverError::I2c)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, DriverError<I::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(TCS34725_ADDRESS, &[COMMAND | register], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(buf[0])
    }

    /// Check the ID register, power on and enable the ADC
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<I::Error>> {
        let id = self.read_reg(reg::ID)?;
        if !KNOWN_IDS.contains(&id) {
            return Err(DriverError::NotFound);
        }

        self.write_reg(reg::ATIME, self.integration as u8)?;
        self.write_reg(reg::CONTROL, self.gain as u8)?;
        self.write_reg(reg::ENABLE, ENABLE_PON)?;
        delay.delay_ms(3);
        self.write_reg(reg::ENABLE, ENABLE_PON | ENABLE_AEN)
    }

    /// Read all four channels in one block transfer
    pub fn read_raw(&mut self) -> Result<RawColor, DriverError<I::Error>> {
        let mut buf = [0u8; 8];
        self.i2c
            .write_read(
                TCS34725_ADDRESS,
                &[COMMAND | AUTO_INCREMENT | reg::CDATAL],
                &mut buf,
            )
            .map_err(DriverError::I2c)?;

        let word = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]);
        Ok(RawColor {
            c: word(0),
            r: word(2),
            g: word(4),
            b: word(6),
        })
    }
}
