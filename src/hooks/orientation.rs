//! Portrait/landscape detection from the gravity direction.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use serde::{Deserialize, Serialize};

/// Tilt beyond which the device is treated as landscape (degrees).
const PORTRAIT_LIMIT_DEG: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationReading {
    /// Elevation of the y axis above the x/z plane (degrees)
    pub tilt_x: f64,
    /// Elevation of the x axis above the y/z plane (degrees)
    pub tilt_y: f64,
    pub is_portrait: bool,
}

impl Default for OrientationReading {
    fn default() -> Self {
        Self {
            tilt_x: 0.0,
            tilt_y: 0.0,
            is_portrait: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceOrientation {
    reading: OrientationReading,
}

impl DeviceOrientation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DerivedMetric for DeviceOrientation {
    type Output = OrientationReading;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<OrientationReading> {
        let SensorReading::Accelerometer(s) = reading else {
            return None;
        };

        let tilt_x = s.y.atan2((s.x * s.x + s.z * s.z).sqrt()).to_degrees();
        let tilt_y = s.x.atan2((s.y * s.y + s.z * s.z).sqrt()).to_degrees();
        self.reading = OrientationReading {
            tilt_x,
            tilt_y,
            is_portrait: tilt_x.abs() < PORTRAIT_LIMIT_DEG,
        };
        Some(self.reading)
    }

    fn value(&self) -> OrientationReading {
        self.reading
    }

    fn reset(&mut self) {
        self.reading = OrientationReading::default();
    }
}
