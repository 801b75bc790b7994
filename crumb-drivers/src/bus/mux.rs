//! TCA9548A I2C multiplexer
//!
//! Several sensors share the same address (three TCS34725 at 0x29), so
//! each sits on its own downstream port. A [`MuxChannel`] wraps a bus
//! handle and selects its port before every transaction, which makes
//! the multiplexer invisible to the device drivers.

use embedded_hal::i2c::{ErrorType, I2c, Operation};

/// Default TCA9548A address
pub const MUX_ADDRESS: u8 = 0x70;

/// Control-register value enabling one downstream port
#[inline]
pub const fn channel_mask(channel: u8) -> u8 {
    1 << (channel & 7)
}

/// I2C handle bound to one multiplexer port
pub struct MuxChannel<I> {
    i2c: I,
    mux_address: u8,
    channel: Option<u8>,
}

impl<I: I2c> MuxChannel<I> {
    /// Handle for a device behind `channel`
    pub fn new(i2c: I, mux_address: u8, channel: u8) -> Self {
        Self {
            i2c,
            mux_address,
            channel: Some(channel),
        }
    }

    /// Handle for a device on the upstream bus; selecting is a no-op
    pub fn direct(i2c: I) -> Self {
        Self {
            i2c,
            mux_address: MUX_ADDRESS,
            channel: None,
        }
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Route the bus to this handle's port
    pub fn select(&mut self) -> Result<(), I::Error> {
        match self.channel {
            Some(ch) => self.i2c.write(self.mux_address, &[channel_mask(ch)]),
            None => Ok(()),
        }
    }

    /// Release the wrapped bus handle
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> ErrorType for MuxChannel<I> {
    type Error = I::Error;
}

impl<I: I2c> I2c for MuxChannel<I> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.select()?;
        self.i2c.transaction(address, operations)
    }
}
