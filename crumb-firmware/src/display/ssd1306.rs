//! SSD1306 OLED display driver
//!
//! 128x64 panel over I2C with a local page-organised frame buffer.
//! Drawing goes through `embedded-graphics`; [`Ssd1306::flush`] pushes
//! the whole buffer with horizontal addressing.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::i2c::I2c;

/// SSD1306 I2C address (0x3C or 0x3D)
pub const SSD1306_ADDR: u8 = 0x3C;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Data bytes sent per I2C write during flush
const FLUSH_CHUNK: usize = 32;

#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Control byte prefixes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

pub struct Ssd1306<I> {
    i2c: I,
    /// 1 bit per pixel, one byte covers 8 vertical pixels of a page
    buffer: [[u8; WIDTH]; PAGES],
}

impl<I: I2c> Ssd1306<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Run the power-up sequence and switch the panel on
    pub fn init(&mut self) -> Result<(), I::Error> {
        const INIT: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Internal charge pump
            cmd::SET_MEMORY_MODE,
            0x00, // Horizontal addressing
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in INIT {
            self.command(c)?;
        }
        self.clear_buffer();
        self.flush()
    }

    fn command(&mut self, c: u8) -> Result<(), I::Error> {
        self.i2c.write(SSD1306_ADDR, &[CONTROL_COMMAND, c])
    }

    pub fn clear_buffer(&mut self) {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
    }

    /// Push the frame buffer to the panel
    pub fn flush(&mut self) -> Result<(), I::Error> {
        for c in [
            cmd::SET_COLUMN_ADDR,
            0,
            (WIDTH - 1) as u8,
            cmd::SET_PAGE_ADDR,
            0,
            (PAGES - 1) as u8,
        ] {
            self.command(c)?;
        }

        let mut data = [0u8; FLUSH_CHUNK + 1];
        data[0] = CONTROL_DATA;
        for page in 0..PAGES {
            for chunk in self.buffer[page].chunks(FLUSH_CHUNK) {
                data[1..=chunk.len()].copy_from_slice(chunk);
                self.i2c.write(SSD1306_ADDR, &data[..=chunk.len()])?;
            }
        }
        Ok(())
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let mask = 1 << (y % 8);
        let byte = &mut self.buffer[y / 8][x];
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

impl<I> OriginDimensions for Ssd1306<I> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<I: I2c> DrawTarget for Ssd1306<I> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < WIDTH && y < HEIGHT {
                    self.set_pixel(x, y, color.is_on());
                }
            }
        }
        Ok(())
    }
}
