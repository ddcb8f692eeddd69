//! Every derived metric active at once.
//!
//! Used by the CLI to watch a full sensor session. Each hook holds its own
//! subscriptions, so the accelerometer alone ends up with six consumers
//! sharing one hardware listener.

use crate::config::MetricsConfig;
use crate::hooks::{
    Altitude, AltitudeTracker, CompassHeading, DeviceOrientation, Heading, MetricHook, Motion,
    OrientationReading, ShakeDetector, ShakeState, SpeedEstimator, StationaryDetector,
    StepCounter, Tilt, TiltTracker,
};
use crate::sensors::{SensorError, SensorRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest value of every metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub heading: Heading,
    pub shakes: ShakeState,
    pub steps: u64,
    pub tilt: Tilt,
    pub altitude: Altitude,
    pub stationary: bool,
    pub motion: Motion,
    pub orientation: OrientationReading,
}

pub struct MetricSet {
    compass: MetricHook<CompassHeading>,
    shake: MetricHook<ShakeDetector>,
    steps: MetricHook<StepCounter>,
    tilt: MetricHook<TiltTracker>,
    altitude: MetricHook<AltitudeTracker>,
    stationary: MetricHook<StationaryDetector>,
    speed: MetricHook<SpeedEstimator>,
    orientation: MetricHook<DeviceOrientation>,
}

impl MetricSet {
    /// Activate every metric against `registry`.
    pub fn activate(registry: &SensorRegistry, config: &MetricsConfig) -> Result<Self, SensorError> {
        Ok(Self {
            compass: MetricHook::activate(registry, CompassHeading::new())?,
            shake: MetricHook::activate(registry, ShakeDetector::with_config(config.shake()))?,
            steps: MetricHook::activate(registry, StepCounter::with_config(config.steps()))?,
            tilt: MetricHook::activate(registry, TiltTracker::new())?,
            altitude: MetricHook::activate(registry, AltitudeTracker::new())?,
            stationary: MetricHook::activate(
                registry,
                StationaryDetector::with_config(config.stationary()),
            )?,
            speed: MetricHook::activate(registry, SpeedEstimator::new())?,
            orientation: MetricHook::activate(registry, DeviceOrientation::new())?,
        })
    }

    /// Feed every pending reading to every metric.
    ///
    /// Returns how many values were republished in total.
    pub fn drain(&mut self) -> usize {
        self.compass.drain().len()
            + self.shake.drain().len()
            + self.steps.drain().len()
            + self.tilt.drain().len()
            + self.altitude.drain().len()
            + self.stationary.drain().len()
            + self.speed.drain().len()
            + self.orientation.drain().len()
    }

    /// Advance timer-driven metrics.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.stationary.tick(now);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            heading: self.compass.value(),
            shakes: self.shake.value(),
            steps: self.steps.value(),
            tilt: self.tilt.value(),
            altitude: self.altitude.value(),
            stationary: self.stationary.value(),
            motion: self.speed.value(),
            orientation: self.orientation.value(),
        }
    }
}
