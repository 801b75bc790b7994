//! Colour sensor array
//!
//! The toaster carries [`COLOR_SENSOR_COUNT`] TCS34725s looking at the
//! bread. Each has its own white reference used to normalise brightness.
//! A sensor that failed to initialise is skipped; the rest keep working.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crumb_core::config::{COLOR_SENSOR_COUNT, DEFAULT_WHITE_REFERENCE, MIN_WHITE_REFERENCE};
use crumb_core::sensors::ColorReading;
use crumb_core::traits::{ColorSensor, SensorError};

use super::tcs34725::Tcs34725;

/// Default sampling period (ms)
pub const DEFAULT_PERIOD_MS: u32 = 250;

/// Samples averaged when a caller asks for zero
const FALLBACK_WHITE_SAMPLES: u16 = 8;
/// Pause between white-calibration samples (ms)
const WHITE_SAMPLE_DELAY_MS: u32 = 5;

pub struct ColorArray<I, D> {
    sensors: [Tcs34725<I>; COLOR_SENSOR_COUNT],
    delay: D,
    present: [bool; COLOR_SENSOR_COUNT],
    readings: [Option<ColorReading>; COLOR_SENSOR_COUNT],
    white_reference: [u16; COLOR_SENSOR_COUNT],
    period_ms: u32,
    last_sample_ms: Option<u32>,
}

impl<I: I2c, D: DelayNs> ColorArray<I, D> {
    pub fn new(sensors: [Tcs34725<I>; COLOR_SENSOR_COUNT], delay: D) -> Self {
        Self {
            sensors,
            delay,
            present: [false; COLOR_SENSOR_COUNT],
            readings: [None; COLOR_SENSOR_COUNT],
            white_reference: [DEFAULT_WHITE_REFERENCE; COLOR_SENSOR_COUNT],
            period_ms: DEFAULT_PERIOD_MS,
            last_sample_ms: None,
        }
    }

    pub fn with_period(mut self, period_ms: u32) -> Self {
        self.period_ms = period_ms;
        self
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.present.get(index).copied().unwrap_or(false)
    }

    /// Number of sensors that came up
    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }
}

impl<I: I2c, D: DelayNs> ColorSensor for ColorArray<I, D> {
    fn begin(&mut self) -> Result<(), SensorError> {
        let mut first_error = None;

        for (sensor, present) in self.sensors.iter_mut().zip(self.present.iter_mut()) {
            match sensor.init(&mut self.delay) {
                Ok(()) => *present = true,
                Err(e) => {
                    *present = false;
                    first_error.get_or_insert(SensorError::from(e));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn update(&mut self, now_ms: u32) {
        if let Some(last) = self.last_sample_ms {
            if now_ms.wrapping_sub(last) < self.period_ms {
                return;
            }
        }
        self.last_sample_ms = Some(now_ms);

        for i in 0..COLOR_SENSOR_COUNT {
            if !self.present[i] {
                continue;
            }
            if let Ok(raw) = self.sensors[i].read_raw() {
                self.readings[i] = Some(ColorReading::from_raw(
                    raw.r,
                    raw.g,
                    raw.b,
                    raw.c,
                    self.white_reference[i],
                ));
            }
        }
    }

    fn reading(&self, index: usize) -> Option<ColorReading> {
        self.readings.get(index).copied().flatten()
    }

    fn calibrate_white(&mut self, index: usize, samples: u16) -> Result<u16, SensorError> {
        if index >= COLOR_SENSOR_COUNT {
            return Err(SensorError::InvalidArgument);
        }
        if !self.present[index] {
            return Err(SensorError::NotFound);
        }

        let samples = if samples == 0 {
            FALLBACK_WHITE_SAMPLES
        } else {
            samples
        };

        let mut sum: u32 = 0;
        for _ in 0..samples {
            sum += self.sensors[index].read_raw()?.c as u32;
            self.delay.delay_ms(WHITE_SAMPLE_DELAY_MS);
        }

        let reference = (sum / samples as u32).max(MIN_WHITE_REFERENCE as u32) as u16;
        self.white_reference[index] = reference;
        Ok(reference)
    }

    fn set_white_reference(&mut self, index: usize, reference: u16) {
        if reference < MIN_WHITE_REFERENCE {
            return;
        }
        if let Some(slot) = self.white_reference.get_mut(index) {
            *slot = reference;
        }
    }

    fn white_reference(&self, index: usize) -> u16 {
        self.white_reference
            .get(index)
            .copied()
            .unwrap_or(DEFAULT_WHITE_REFERENCE)
    }
}
