//! Colour normalization

/// Clear counts below this are treated as darkness
const MIN_CLEAR: u16 = 5;

/// One normalized colour sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorReading {
    pub r16: u16,
    pub g16: u16,
    pub b16: u16,
    pub c16: u16,
    pub r8: u8,
    pub g8: u8,
    pub b8: u8,
    /// `c16 / cref`, clamped to 0..=1
    pub brightness: f32,
    /// White reference in effect when the reading was taken
    pub cref: u16,
}

impl ColorReading {
    /// Normalize raw channel counts against the clear channel
    ///
    /// Each colour becomes `channel * 255 / clear` saturated at 255, so
    /// the result describes hue independent of illumination. Brightness
    /// is reported separately against the white reference.
    pub fn from_raw(r: u16, g: u16, b: u16, c: u16, cref: u16) -> Self {
        let mut reading = Self {
            r16: r,
            g16: g,
            b16: b,
            c16: c,
            cref,
            ..Default::default()
        };

        if c < MIN_CLEAR {
            return reading;
        }

        let scale = |ch: u16| -> u8 {
            let v = (ch as u32 * 255) / c as u32;
            if v > 255 {
                255
            } else {
                v as u8
            }
        };

        reading.r8 = scale(r);
        reading.g8 = scale(g);
        reading.b8 = scale(b);

        reading.brightness = if cref == 0 {
            1.0
        } else {
            (c as f32 / cref as f32).clamp(0.0, 1.0)
        };

        reading
    }

    /// 8-bit colour triple
    pub fn rgb8(&self) -> (u8, u8, u8) {
        (self.r8, self.g8, self.b8)
    }
}
