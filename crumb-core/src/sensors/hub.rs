//! Sensor aggregator
//!
//! Owns one weight sensor, one thermometer and one colour array and
//! exposes them as a [`SensorSource`].

use crate::config::{CalibrationCommand, CalibrationData, COLOR_SENSOR_COUNT};
use crate::traits::{ColorSensor, SensorError, SensorSource, TemperatureSensor, WeightSensor};

use super::{ColorReading, SensorSnapshot};

/// Default number of clear readings averaged by white calibration
pub const DEFAULT_WHITE_SAMPLES: u16 = 16;

/// Which devices came up at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeginReport {
    pub weight: bool,
    pub temperature: bool,
    pub color: bool,
}

impl BeginReport {
    /// True when every device responded
    pub fn all_ok(&self) -> bool {
        self.weight && self.temperature && self.color
    }
}

/// Aggregates the three sensor families
pub struct SensorHub<W, T, C> {
    weight: W,
    temperature: T,
    color: C,
    white_samples: u16,
}

impl<W, T, C> SensorHub<W, T, C>
where
    W: WeightSensor,
    T: TemperatureSensor,
    C: ColorSensor,
{
    pub fn new(weight: W, temperature: T, color: C) -> Self {
        Self {
            weight,
            temperature,
            color,
            white_samples: DEFAULT_WHITE_SAMPLES,
        }
    }

    /// Override the sample count used by white calibration
    pub fn with_white_samples(mut self, samples: u16) -> Self {
        self.white_samples = samples;
        self
    }

    pub fn weight(&self) -> &W {
        &self.weight
    }

    pub fn temperature(&self) -> &T {
        &self.temperature
    }

    pub fn color(&self) -> &C {
        &self.color
    }

    /// Latest reading of one colour sensor
    pub fn color_reading(&self, index: usize) -> Option<ColorReading> {
        self.color.reading(index)
    }
}

impl<W, T, C> SensorSource for SensorHub<W, T, C>
where
    W: WeightSensor,
    T: TemperatureSensor,
    C: ColorSensor,
{
    fn begin_all(&mut self) -> BeginReport {
        BeginReport {
            weight: self.weight.begin().is_ok(),
            temperature: self.temperature.begin().is_ok(),
            color: self.color.begin().is_ok(),
        }
    }

    fn poll_all(&mut self, now_ms: u32) {
        self.temperature.update(now_ms);
        self.weight.update(now_ms);
        self.color.update(now_ms);
    }

    fn snapshot(&self) -> SensorSnapshot {
        let (color, brightness) = match self.color.reading(0) {
            Some(reading) => (reading.rgb8(), reading.brightness),
            None => ((0, 0, 0), 0.0),
        };

        SensorSnapshot {
            temperature_c: self.temperature.object_c(),
            weight_g: self.weight.weight_g(),
            color,
            brightness,
        }
    }

    fn restore_calibration(&mut self, data: &CalibrationData) {
        // Zero offset is re-established by the tare in `begin`
        self.weight.set_counts_per_gram(data.counts_per_gram);
        for (index, &reference) in data.white_reference.iter().enumerate() {
            self.color.set_white_reference(index, reference);
        }
    }

    fn apply_calibration(&mut self, command: CalibrationCommand) -> Result<(), SensorError> {
        match command {
            CalibrationCommand::Tare => self.weight.tare(),
            CalibrationCommand::Calibrate { known_mass_g } => self.weight.calibrate(known_mass_g),
            CalibrationCommand::SetBaseline => {
                self.weight.set_baseline_to_current();
                Ok(())
            }
            CalibrationCommand::CalibrateWhite { sensor } => {
                let index = sensor as usize;
                if index >= COLOR_SENSOR_COUNT {
                    return Err(SensorError::InvalidArgument);
                }
                self.color
                    .calibrate_white(index, self.white_samples)
                    .map(|_| ())
            }
        }
    }

    fn calibration(&self) -> CalibrationData {
        let mut data = CalibrationData::new();
        data.counts_per_gram = self.weight.counts_per_gram();
        data.zero_offset = self.weight.zero_offset();
        for (index, reference) in data.white_reference.iter_mut().enumerate() {
            *reference = self.color.white_reference(index);
        }
        data.update_crc();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WHITE_REFERENCE;

    struct FakeScale {
        grams: f32,
        cpg: f32,
        offset: i32,
        fail: bool,
        baseline_set: bool,
        updates: u32,
    }

    impl FakeScale {
        fn new(grams: f32) -> Self {
            Self {
                grams,
                cpg: 700.0,
                offset: 0,
                fail: false,
                baseline_set: false,
                updates: 0,
            }
        }
    }

    impl WeightSensor for FakeScale {
        fn begin(&mut self) -> Result<(), SensorError> {
            if self.fail {
                Err(SensorError::NotFound)
            } else {
                Ok(())
            }
        }
        fn update(&mut self, _now_ms: u32) {
            self.updates += 1;
        }
        fn weight_g(&self) -> f32 {
            self.grams
        }
        fn tare(&mut self) -> Result<(), SensorError> {
            self.offset = 4242;
            self.grams = 0.0;
            Ok(())
        }
        fn calibrate(&mut self, known_mass_g: f32) -> Result<(), SensorError> {
            if known_mass_g <= 0.0 {
                return Err(SensorError::InvalidArgument);
            }
            self.cpg = 512.0;
            Ok(())
        }
        fn set_counts_per_gram(&mut self, counts_per_gram: f32) {
            if counts_per_gram > 0.0 {
                self.cpg = counts_per_gram;
            }
        }
        fn set_baseline_to_current(&mut self) {
            self.baseline_set = true;
        }
        fn counts_per_gram(&self) -> f32 {
            self.cpg
        }
        fn zero_offset(&self) -> i32 {
            self.offset
        }
    }

    struct FakeThermometer(f32);

    impl TemperatureSensor for FakeThermometer {
        fn begin(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
        fn update(&mut self, _now_ms: u32) {}
        fn object_c(&self) -> f32 {
            self.0
        }
        fn ambient_c(&self) -> f32 {
            22.0
        }
    }

    struct FakeColors {
        refs: [u16; COLOR_SENSOR_COUNT],
        first: Option<ColorReading>,
        fail: bool,
    }

    impl ColorSensor for FakeColors {
        fn begin(&mut self) -> Result<(), SensorError> {
            if self.fail {
                Err(SensorError::NotFound)
            } else {
                Ok(())
            }
        }
        fn update(&mut self, _now_ms: u32) {}
        fn reading(&self, index: usize) -> Option<ColorReading> {
            if index == 0 {
                self.first
            } else {
                None
            }
        }
        fn calibrate_white(&mut self, index: usize, samples: u16) -> Result<u16, SensorError> {
            self.refs[index] = samples * 100;
            Ok(self.refs[index])
        }
        fn set_white_reference(&mut self, index: usize, reference: u16) {
            if reference >= 10 {
                if let Some(slot) = self.refs.get_mut(index) {
                    *slot = reference;
                }
            }
        }
        fn white_reference(&self, index: usize) -> u16 {
            self.refs.get(index).copied().unwrap_or(0)
        }
    }

    fn hub(grams: f32, temp: f32) -> SensorHub<FakeScale, FakeThermometer, FakeColors> {
        SensorHub::new(
            FakeScale::new(grams),
            FakeThermometer(temp),
            FakeColors {
                refs: [DEFAULT_WHITE_REFERENCE; COLOR_SENSOR_COUNT],
                first: None,
                fail: false,
            },
        )
    }

    #[test]
    fn test_snapshot_merges_readings() {
        let mut hub = hub(123.0, 18.5);
        hub.color.first = Some(ColorReading::from_raw(600, 300, 0, 600, 1200));
        let snap = hub.snapshot();
        assert_eq!(snap.weight_g, 123.0);
        assert_eq!(snap.temperature_c, 18.5);
        assert_eq!(snap.color, (255, 127, 0));
        assert_eq!(snap.brightness, 0.5);
    }

    #[test]
    fn test_snapshot_without_color_is_black() {
        let hub = hub(1.0, 20.0);
        let snap = hub.snapshot();
        assert_eq!(snap.color, (0, 0, 0));
        assert_eq!(snap.brightness, 0.0);
    }

    #[test]
    fn test_begin_report_flags_failures() {
        let mut hub = hub(0.0, 20.0);
        hub.weight.fail = true;
        hub.color.fail = true;
        let report = hub.begin_all();
        assert!(!report.weight);
        assert!(report.temperature);
        assert!(!report.color);
        assert!(!report.all_ok());
    }

    #[test]
    fn test_poll_reaches_every_sensor() {
        let mut hub = hub(0.0, 20.0);
        hub.poll_all(0);
        hub.poll_all(10);
        assert_eq!(hub.weight.updates, 2);
    }

    #[test]
    fn test_calibration_commands_dispatch() {
        let mut hub = hub(50.0, 20.0);

        assert_eq!(hub.apply_calibration(CalibrationCommand::Tare), Ok(()));
        assert_eq!(hub.weight.offset, 4242);

        assert_eq!(
            hub.apply_calibration(CalibrationCommand::Calibrate { known_mass_g: 200.0 }),
            Ok(())
        );
        assert_eq!(hub.weight.cpg, 512.0);

        assert_eq!(hub.apply_calibration(CalibrationCommand::SetBaseline), Ok(()));
        assert!(hub.weight.baseline_set);

        assert_eq!(
            hub.apply_calibration(CalibrationCommand::CalibrateWhite { sensor: 1 }),
            Ok(())
        );
        assert_eq!(hub.color.refs[1], DEFAULT_WHITE_SAMPLES * 100);
    }

    #[test]
    fn test_white_calibration_index_checked() {
        let mut hub = hub(0.0, 20.0);
        assert_eq!(
            hub.apply_calibration(CalibrationCommand::CalibrateWhite { sensor: 3 }),
            Err(SensorError::InvalidArgument)
        );
    }

    #[test]
    fn test_calibration_round_trip_through_hub() {
        let mut hub = hub(0.0, 20.0);
        let mut data = CalibrationData::new();
        data.counts_per_gram = 640.0;
        data.white_reference = [900, 1000, 1100];
        hub.restore_calibration(&data);

        let exported = hub.calibration();
        assert_eq!(exported.counts_per_gram, 640.0);
        assert_eq!(exported.white_reference, [900, 1000, 1100]);
        assert!(exported.is_valid());
        assert!(exported.verify_crc());
    }
}
