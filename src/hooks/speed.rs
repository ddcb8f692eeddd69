//! Speed and distance by naive double integration.
//!
//! Velocity is the running integral of raw acceleration per axis; distance
//! is the integral of speed. Gravity is not removed and velocity is never
//! corrected back to zero, so both values drift upward without bound. This
//! is a known limitation of the estimate, not a fault to be hidden.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Magnitude of the integrated velocity (m/s)
    pub speed: f64,
    /// Integrated distance (m)
    pub distance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SpeedEstimator {
    velocity: [f64; 3],
    motion: Motion,
    last: Option<DateTime<Utc>>,
}

impl SpeedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrated velocity vector (m/s).
    pub fn velocity(&self) -> [f64; 3] {
        self.velocity
    }
}

impl DerivedMetric for SpeedEstimator {
    type Output = Motion;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<Motion> {
        let SensorReading::Accelerometer(sample) = reading else {
            return None;
        };

        // First sample only establishes the time base.
        let dt = self
            .last
            .and_then(|last| (sample.timestamp - last).num_microseconds())
            .map(|us| us.max(0) as f64 / 1_000_000.0)
            .unwrap_or(0.0);
        self.last = Some(sample.timestamp);

        self.velocity[0] += sample.x * dt;
        self.velocity[1] += sample.y * dt;
        self.velocity[2] += sample.z * dt;

        let [vx, vy, vz] = self.velocity;
        self.motion.speed = (vx * vx + vy * vy + vz * vz).sqrt();
        self.motion.distance += self.motion.speed * dt;
        Some(self.motion)
    }

    fn value(&self) -> Motion {
        self.motion
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorSample;
    use chrono::Duration;

    #[test]
    fn test_constant_acceleration() {
        let mut estimator = SpeedEstimator::new();
        let t0 = Utc::now();
        let a = 2.0;

        // T = 1s in 1ms steps
        for i in 0..=1000 {
            estimator.update(&SensorReading::Accelerometer(SensorSample::at(
                a,
                0.0,
                0.0,
                t0 + Duration::milliseconds(i),
            )));
        }

        let motion = estimator.value();
        assert!((motion.speed - a).abs() < 1e-9, "speed = {}", motion.speed);
        // a*T²/2 = 1.0; rectangle rule overshoots by a*T*dt/2
        assert!((motion.distance - 1.0).abs() < 0.01, "distance = {}", motion.distance);
    }

    #[test]
    fn test_first_sample_has_no_effect() {
        let mut estimator = SpeedEstimator::new();
        let out = estimator
            .update(&SensorReading::Accelerometer(SensorSample::new(5.0, 5.0, 5.0)))
            .unwrap();
        assert_eq!(out, Motion::default());
    }

    #[test]
    fn test_gravity_drifts() {
        let mut estimator = SpeedEstimator::new();
        let t0 = Utc::now();

        // A device at rest still reports gravity; the estimate keeps climbing.
        let mut previous = 0.0;
        for i in 0..=10 {
            let motion = estimator
                .update(&SensorReading::Accelerometer(SensorSample::at(
                    0.0,
                    0.0,
                    9.81,
                    t0 + Duration::milliseconds(i * 100),
                )))
                .unwrap();
            assert!(motion.speed >= previous);
            previous = motion.speed;
        }
        assert!((previous - 9.81).abs() < 1e-9);
    }
}
