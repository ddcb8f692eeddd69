//! Relative altitude tracking from the barometer.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use serde::{Deserialize, Serialize};

/// Current and extreme relative altitude, in meters.
///
/// Min and max start at zero (the subscription origin) and only ever move
/// outward; there is no way to reset them short of reactivating the hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Altitude {
    pub current: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AltitudeTracker {
    altitude: Altitude,
}

impl AltitudeTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DerivedMetric for AltitudeTracker {
    type Output = Altitude;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Barometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<Altitude> {
        let SensorReading::Barometer(sample) = reading else {
            return None;
        };
        let altitude = sample.relative_altitude;
        self.altitude.current = altitude;
        self.altitude.max = self.altitude.max.max(altitude);
        self.altitude.min = self.altitude.min.min(altitude);
        Some(self.altitude)
    }

    fn value(&self) -> Altitude {
        self.altitude
    }

    fn reset(&mut self) {
        self.altitude = Altitude::default();
    }
}
