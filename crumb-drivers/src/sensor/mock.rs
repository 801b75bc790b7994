//! Simulated I2C bus for driver tests
//!
//! Devices are register files keyed by address. The colour sensors and
//! the thermometer sit behind the multiplexer, so their register files
//! are additionally keyed by the currently selected port mask.

extern crate std;

use std::collections::{HashMap, HashSet};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::bus::MUX_ADDRESS;

const NAU_ADDR: u8 = 0x2A;
const MLX_ADDR: u8 = 0x5A;
const TCS_ADDR: u8 = 0x29;

/// Delay that returns immediately
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub struct MockBus {
    banks: HashMap<(u8, u8), [u8; 256]>,
    pointers: HashMap<(u8, u8), u8>,
    present: HashSet<(u8, u8)>,
    mux_mask: u8,
    mux_writes: Vec<u8>,
    adc_ready: bool,
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            banks: HashMap::new(),
            pointers: HashMap::new(),
            present: HashSet::new(),
            mux_mask: 0,
            mux_writes: Vec::new(),
            adc_ready: false,
            writes: Vec::new(),
        }
    }

    fn key(&self, address: u8) -> (u8, u8) {
        if address == TCS_ADDR || address == MLX_ADDR {
            (self.mux_mask, address)
        } else {
            (0, address)
        }
    }

    fn bank(&mut self, key: (u8, u8)) -> &mut [u8; 256] {
        self.banks.entry(key).or_insert([0; 256])
    }

    pub fn mux_selects(&self) -> usize {
        self.mux_writes.len()
    }

    pub fn last_mux_mask(&self) -> Option<u8> {
        self.mux_writes.last().copied()
    }

    /// Attach a NAU7802 on the upstream bus
    pub fn add_nau7802(&mut self) {
        self.present.insert((0, NAU_ADDR));
        self.bank((0, NAU_ADDR));
    }

    /// Put a conversion result in the ADC output registers
    pub fn set_adc(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        let bank = self.bank((0, NAU_ADDR));
        bank[0x12] = bytes[1];
        bank[0x13] = bytes[2];
        bank[0x14] = bytes[3];
        bank[0x00] |= 1 << 5;
        self.adc_ready = true;
    }

    pub fn nau_reg(&mut self, reg: u8) -> u8 {
        self.bank((0, NAU_ADDR))[reg as usize]
    }

    /// Attach an MLX90614 behind a mux port mask
    pub fn add_mlx90614(&mut self, mask: u8) {
        self.present.insert((mask, MLX_ADDR));
        self.bank((mask, MLX_ADDR));
    }

    pub fn set_mlx_word(&mut self, mask: u8, reg: u8, value: u16) {
        let bank = self.bank((mask, MLX_ADDR));
        let [lo, hi] = value.to_le_bytes();
        bank[reg as usize * 2] = lo;
        bank[reg as usize * 2 + 1] = hi;
    }

    /// Attach a TCS34725 behind a mux port mask
    pub fn add_tcs34725(&mut self, mask: u8) {
        self.present.insert((mask, TCS_ADDR));
        self.bank((mask, TCS_ADDR))[0x12] = 0x44;
    }

    pub fn set_tcs_id(&mut self, mask: u8, id: u8) {
        self.bank((mask, TCS_ADDR))[0x12] = id;
    }

    pub fn set_tcs_raw(&mut self, mask: u8, r: u16, g: u16, b: u16, c: u16) {
        let bank = self.bank((mask, TCS_ADDR));
        for (i, v) in [c, r, g, b].iter().enumerate() {
            let [lo, hi] = v.to_le_bytes();
            bank[0x14 + i * 2] = lo;
            bank[0x15 + i * 2] = hi;
        }
    }

    pub fn tcs_reg(&mut self, mask: u8, reg: u8) -> u8 {
        self.bank((mask, TCS_ADDR))[reg as usize]
    }

    fn write(&mut self, address: u8, bytes: &[u8]) {
        self.writes.push((address, bytes.to_vec()));

        if address == MUX_ADDRESS {
            if let Some(&mask) = bytes.first() {
                self.mux_mask = mask;
                self.mux_writes.push(mask);
            }
            return;
        }

        let Some((&first, data)) = bytes.split_first() else {
            return;
        };
        let key = self.key(address);
        let pointer = if address == TCS_ADDR { first & 0x1F } else { first };
        self.pointers.insert(key, pointer);

        let adc_ready = self.adc_ready;
        let bank = self.bank(key);
        for (i, &b) in data.iter().enumerate() {
            bank[(pointer as usize + i) & 0xFF] = b;
        }

        if address == NAU_ADDR && !data.is_empty() {
            match pointer {
                0x00 => {
                    if bank[0x00] & (1 << 1) != 0 {
                        bank[0x00] |= 1 << 3;
                    }
                    if adc_ready {
                        bank[0x00] |= 1 << 5;
                    }
                }
                0x02 => bank[0x02] &= !(1 << 2),
                _ => {}
            }
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) {
        let key = self.key(address);
        let pointer = self.pointers.get(&key).copied().unwrap_or(0) as usize;
        let bank = *self.bank(key);

        if address == MLX_ADDR {
            let lo = bank[pointer * 2];
            let hi = bank[pointer * 2 + 1];
            for (i, b) in buf.iter_mut().enumerate() {
                *b = match i {
                    0 => lo,
                    1 => hi,
                    _ => 0,
                };
            }
            return;
        }

        for (i, b) in buf.iter_mut().enumerate() {
            *b = bank[(pointer + i) & 0xFF];
        }
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != MUX_ADDRESS && !self.present.contains(&self.key(address)) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => self.write(address, bytes),
                Operation::Read(buf) => self.read(address, buf),
            }
        }
        Ok(())
    }
}
