//! Naive step counting.
//!
//! Any accelerometer sample above the threshold counts as a step, provided
//! the previous counted step is far enough in the past. There is no true peak
//! detection and no filtering.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use chrono::{DateTime, Duration, Utc};

/// Configuration for step counting.
#[derive(Debug, Clone, Copy)]
pub struct StepConfig {
    /// Magnitude that counts as a step peak (m/s²)
    pub threshold: f64,
    /// Minimum spacing between counted steps
    pub min_interval: Duration,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            threshold: 15.0,
            min_interval: Duration::milliseconds(250),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepCounter {
    config: StepConfig,
    steps: u64,
    last_peak: Option<DateTime<Utc>>,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::with_config(StepConfig::default())
    }

    pub fn with_config(config: StepConfig) -> Self {
        Self {
            config,
            steps: 0,
            last_peak: None,
        }
    }
}

impl DerivedMetric for StepCounter {
    type Output = u64;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<u64> {
        let SensorReading::Accelerometer(sample) = reading else {
            return None;
        };

        let spaced = self
            .last_peak
            .map_or(true, |last| sample.timestamp - last > self.config.min_interval);

        if sample.magnitude() > self.config.threshold && spaced {
            self.steps += 1;
            self.last_peak = Some(sample.timestamp);
        }
        Some(self.steps)
    }

    fn value(&self) -> u64 {
        self.steps
    }

    fn reset(&mut self) {
        self.steps = 0;
        self.last_peak = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorSample;

    fn accel_at(magnitude: f64, t: DateTime<Utc>) -> SensorReading {
        SensorReading::Accelerometer(SensorSample::at(magnitude, 0.0, 0.0, t))
    }

    #[test]
    fn test_close_peaks_count_once() {
        let mut counter = StepCounter::new();
        let t0 = Utc::now();

        counter.update(&accel_at(18.0, t0));
        counter.update(&accel_at(18.0, t0 + Duration::milliseconds(100)));
        assert_eq!(counter.value(), 1);
    }

    #[test]
    fn test_spaced_peaks_each_count() {
        let mut counter = StepCounter::new();
        let t0 = Utc::now();

        for i in 0..4 {
            counter.update(&accel_at(18.0, t0 + Duration::milliseconds(i * 300)));
            counter.update(&accel_at(9.8, t0 + Duration::milliseconds(i * 300 + 150)));
        }
        assert_eq!(counter.value(), 4);
    }

    #[test]
    fn test_republishes_on_every_sample() {
        let mut counter = StepCounter::new();
        let t0 = Utc::now();

        assert_eq!(counter.update(&accel_at(9.8, t0)), Some(0));
        assert_eq!(counter.update(&accel_at(16.0, t0)), Some(1));
        assert_eq!(
            counter.update(&SensorReading::Gyroscope(SensorSample::at(9.0, 9.0, 9.0, t0))),
            None
        );
    }
}
