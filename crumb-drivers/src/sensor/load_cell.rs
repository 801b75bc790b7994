//! Load cell scaling, smoothing and calibration
//!
//! Wraps any [`LoadCellAdc`] and turns raw conversions into grams:
//! `(raw - zero_offset) / counts_per_gram`, a small deadband around
//! zero, then exponential smoothing. Sampling is self-throttled so
//! `update` can be called every controller tick.

use embedded_hal::delay::DelayNs;

use crumb_core::config::DEFAULT_COUNTS_PER_GRAM;
use crumb_core::traits::{SensorError, WeightSensor};

use crate::DriverError;

/// Raw 24-bit load-cell converter
pub trait LoadCellAdc {
    type Error;

    /// Configure the converter and start continuous conversions
    fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<Self::Error>>;

    /// True when a new conversion can be read
    fn data_ready(&mut self) -> Result<bool, DriverError<Self::Error>>;

    /// Latest conversion in raw counts
    fn read_raw(&mut self) -> Result<i32, DriverError<Self::Error>>;
}

/// Load cell tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadCellConfig {
    /// Minimum time between samples (ms)
    pub period_ms: u32,
    /// Readings averaged by tare and calibration
    pub tare_samples: u8,
    /// Readings closer to zero than this read as zero (g)
    pub deadband_g: f32,
    /// EMA weight of the newest sample
    pub smoothing_alpha: f32,
    /// How long averaging waits for each conversion (ms)
    pub sample_timeout_ms: u32,
}

impl Default for LoadCellConfig {
    fn default() -> Self {
        Self {
            period_ms: 200,
            tare_samples: 32,
            deadband_g: 0.5,
            smoothing_alpha: 0.2,
            sample_timeout_ms: 250,
        }
    }
}

/// Scale built on a load-cell ADC
pub struct LoadCell<A, D> {
    adc: A,
    delay: D,
    config: LoadCellConfig,
    counts_per_gram: f32,
    zero_offset: i32,
    raw_g: f32,
    weight_g: f32,
    baseline_g: f32,
    last_sample_ms: Option<u32>,
    ready: bool,
}

impl<A: LoadCellAdc, D: DelayNs> LoadCell<A, D> {
    pub fn new(adc: A, delay: D, config: LoadCellConfig) -> Self {
        Self {
            adc,
            delay,
            config,
            counts_per_gram: DEFAULT_COUNTS_PER_GRAM,
            zero_offset: 0,
            raw_g: 0.0,
            weight_g: 0.0,
            baseline_g: 0.0,
            last_sample_ms: None,
            ready: false,
        }
    }

    /// Latest unsmoothed reading (g)
    pub fn raw_g(&self) -> f32 {
        self.raw_g
    }

    pub fn baseline_g(&self) -> f32 {
        self.baseline_g
    }

    /// Smoothed weight relative to the baseline (g)
    pub fn delta_from_baseline_g(&self) -> f32 {
        self.weight_g - self.baseline_g
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Average `samples` conversions, waiting a bounded time for each
    fn averaged_reading(&mut self, samples: u8) -> Result<i32, DriverError<A::Error>> {
        let n = samples.max(1) as i64;
        let mut sum: i64 = 0;

        for _ in 0..n {
            sum += self.wait_for_conversion()? as i64;
        }

        Ok((sum / n) as i32)
    }

    fn wait_for_conversion(&mut self) -> Result<i32, DriverError<A::Error>> {
        for _ in 0..self.config.sample_timeout_ms {
            if self.adc.data_ready()? {
                return self.adc.read_raw();
            }
            self.delay.delay_ms(1);
        }
        Err(DriverError::Timeout)
    }

    fn to_grams(&self, raw: i32) -> f32 {
        let grams = (raw as i64 - self.zero_offset as i64) as f32 / self.counts_per_gram;
        if grams.is_finite() && crate::abs(grams) <= self.config.deadband_g {
            0.0
        } else {
            grams
        }
    }

    fn ensure_ready(&self) -> Result<(), SensorError> {
        if self.ready {
            Ok(())
        } else {
            Err(SensorError::NotFound)
        }
    }
}

impl<A: LoadCellAdc, D: DelayNs> WeightSensor for LoadCell<A, D> {
    fn begin(&mut self) -> Result<(), SensorError> {
        self.adc.init(&mut self.delay)?;
        self.ready = true;

        self.zero_offset = self.averaged_reading(self.config.tare_samples)?;
        self.raw_g = 0.0;
        self.weight_g = 0.0;
        self.baseline_g = 0.0;
        Ok(())
    }

    fn update(&mut self, now_ms: u32) {
        if !self.ready {
            return;
        }
        if let Some(last) = self.last_sample_ms {
            if now_ms.wrapping_sub(last) < self.config.period_ms {
                return;
            }
        }

        // Not ready or failed: keep the previous value and retry next call
        let raw = match self.adc.data_ready() {
            Ok(true) => match self.adc.read_raw() {
                Ok(raw) => raw,
                Err(_) => return,
            },
            _ => return,
        };
        self.last_sample_ms = Some(now_ms);

        let grams = self.to_grams(raw);
        self.raw_g = grams;
        let alpha = self.config.smoothing_alpha;
        self.weight_g = (1.0 - alpha) * self.weight_g + alpha * grams;
    }

    fn weight_g(&self) -> f32 {
        self.weight_g
    }

    fn tare(&mut self) -> Result<(), SensorError> {
        self.ensure_ready()?;
        self.zero_offset = self.averaged_reading(self.config.tare_samples)?;
        self.baseline_g = 0.0;
        Ok(())
    }

    fn calibrate(&mut self, known_mass_g: f32) -> Result<(), SensorError> {
        if !(known_mass_g > 0.0 && known_mass_g.is_finite()) {
            return Err(SensorError::InvalidArgument);
        }
        self.ensure_ready()?;

        let loaded = self.averaged_reading(self.config.tare_samples)?;
        let delta = loaded as i64 - self.zero_offset as i64;
        if delta <= 0 {
            return Err(SensorError::InvalidReading);
        }

        self.counts_per_gram = delta as f32 / known_mass_g;
        Ok(())
    }

    fn set_counts_per_gram(&mut self, counts_per_gram: f32) {
        if counts_per_gram > 0.0 && counts_per_gram.is_finite() {
            self.counts_per_gram = counts_per_gram;
        }
    }

    fn set_baseline_to_current(&mut self) {
        self.baseline_g = self.weight_g;
    }

    fn counts_per_gram(&self) -> f32 {
        self.counts_per_gram
    }

    fn zero_offset(&self) -> i32 {
        self.zero_offset
    }
}
