//! Pitch and roll from gravity, yaw from integrated gyroscope rate.
//!
//! Pitch and roll come straight from the accelerometer direction. Yaw is the
//! gyroscope z-rate integrated over sample time; the instantaneous rate is
//! reported separately as `yaw_rate`. Integrated yaw drifts without bound,
//! there is no magnetometer correction.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device tilt in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tilt {
    /// Forward/backward tilt, `atan2(y, z)`
    pub pitch: f64,
    /// Left/right tilt, `atan2(x, z)`
    pub roll: f64,
    /// Rotation about z since activation, wrapped to (-180, 180]
    pub yaw: f64,
    /// Latest angular rate about z (degrees per second)
    pub yaw_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TiltTracker {
    tilt: Tilt,
    last_gyro: Option<DateTime<Utc>>,
}

impl TiltTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

impl DerivedMetric for TiltTracker {
    type Output = Tilt;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer, SensorKind::Gyroscope]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<Tilt> {
        match reading {
            SensorReading::Accelerometer(accel) => {
                self.tilt.pitch = accel.y.atan2(accel.z).to_degrees();
                self.tilt.roll = accel.x.atan2(accel.z).to_degrees();
            }
            SensorReading::Gyroscope(gyro) => {
                let dt = self
                    .last_gyro
                    .and_then(|last| (gyro.timestamp - last).num_microseconds())
                    .map(|us| us.max(0) as f64 / 1_000_000.0)
                    .unwrap_or(0.0);
                self.last_gyro = Some(gyro.timestamp);

                self.tilt.yaw_rate = gyro.z.to_degrees();
                self.tilt.yaw = wrap_degrees(self.tilt.yaw + self.tilt.yaw_rate * dt);
            }
            _ => return None,
        }
        Some(self.tilt)
    }

    fn value(&self) -> Tilt {
        self.tilt
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
