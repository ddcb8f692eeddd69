//! Stationary detection.
//!
//! The device counts as stationary once acceleration magnitude has stayed
//! below the threshold for the whole timeout. A single pending deadline is
//! armed by the first quiet sample; any sample at or above the threshold
//! clears both the deadline and the flag.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use chrono::{DateTime, Duration, Utc};

/// Configuration for stationary detection.
#[derive(Debug, Clone, Copy)]
pub struct StationaryConfig {
    /// Magnitude below which the device is considered still (m/s²)
    pub threshold: f64,
    /// How long it must stay still
    pub timeout: Duration,
}

impl Default for StationaryConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            timeout: Duration::milliseconds(3000),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StationaryDetector {
    config: StationaryConfig,
    deadline: Option<DateTime<Utc>>,
    is_stationary: bool,
}

impl StationaryDetector {
    pub fn new() -> Self {
        Self::with_config(StationaryConfig::default())
    }

    pub fn with_config(config: StationaryConfig) -> Self {
        Self {
            config,
            deadline: None,
            is_stationary: false,
        }
    }

    /// Whether a quiet period is currently being timed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some() && !self.is_stationary
    }

    fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if !self.is_stationary && now >= deadline => {
                self.is_stationary = true;
                true
            }
            _ => false,
        }
    }
}

impl DerivedMetric for StationaryDetector {
    type Output = bool;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<bool> {
        let SensorReading::Accelerometer(sample) = reading else {
            return None;
        };

        if sample.magnitude() < self.config.threshold {
            if self.deadline.is_none() {
                // A timeout past the end of the calendar never elapses.
                self.deadline = sample.timestamp.checked_add_signed(self.config.timeout);
            }
            self.expire(sample.timestamp);
        } else {
            self.deadline = None;
            self.is_stationary = false;
        }
        Some(self.is_stationary)
    }

    fn value(&self) -> bool {
        self.is_stationary
    }

    fn poll(&mut self, now: DateTime<Utc>) -> Option<bool> {
        self.expire(now).then_some(true)
    }

    fn reset(&mut self) {
        self.deadline = None;
        self.is_stationary = false;
    }
}
