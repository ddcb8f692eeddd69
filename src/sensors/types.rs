//! Sample types delivered by the platform sensor drivers.
//!
//! Samples are transient: consumers keep at most the latest one (or a small
//! accumulator derived from it) and never store history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical sensor kinds the registry can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Linear acceleration in m/s²
    Accelerometer,
    /// Angular rate in rad/s
    Gyroscope,
    /// Magnetic field in µT
    Magnetometer,
    /// Pressure in hPa plus relative altitude in meters
    Barometer,
}

impl SensorKind {
    /// Every kind, in registry order.
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Accelerometer,
        SensorKind::Gyroscope,
        SensorKind::Magnetometer,
        SensorKind::Barometer,
    ];

    /// Whether the platform exposes an update interval for this kind.
    pub fn supports_update_interval(self) -> bool {
        matches!(self, SensorKind::Accelerometer | SensorKind::Gyroscope)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Magnetometer => "magnetometer",
            SensorKind::Barometer => "barometer",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A three-axis sample from the accelerometer, gyroscope or magnetometer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Instant the driver produced the sample
    pub timestamp: DateTime<Utc>,
}

impl SensorSample {
    /// Create a sample stamped with the current time.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::at(x, y, z, Utc::now())
    }

    /// Create a sample with an explicit timestamp.
    pub fn at(x: f64, y: f64, z: f64, timestamp: DateTime<Utc>) -> Self {
        Self { x, y, z, timestamp }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A barometer sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarometerSample {
    /// Pressure in hPa
    pub pressure: f64,
    /// Altitude in meters relative to where the subscription started
    pub relative_altitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl BarometerSample {
    pub fn new(pressure: f64, relative_altitude: f64) -> Self {
        Self::at(pressure, relative_altitude, Utc::now())
    }

    pub fn at(pressure: f64, relative_altitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            pressure,
            relative_altitude,
            timestamp,
        }
    }
}

/// A reading from any sensor kind, as fanned out by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sample", rename_all = "lowercase")]
pub enum SensorReading {
    Accelerometer(SensorSample),
    Gyroscope(SensorSample),
    Magnetometer(SensorSample),
    Barometer(BarometerSample),
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Accelerometer(_) => SensorKind::Accelerometer,
            SensorReading::Gyroscope(_) => SensorKind::Gyroscope,
            SensorReading::Magnetometer(_) => SensorKind::Magnetometer,
            SensorReading::Barometer(_) => SensorKind::Barometer,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorReading::Accelerometer(s)
            | SensorReading::Gyroscope(s)
            | SensorReading::Magnetometer(s) => s.timestamp,
            SensorReading::Barometer(b) => b.timestamp,
        }
    }

    /// The three-axis sample, if this reading has one.
    pub fn motion(&self) -> Option<&SensorSample> {
        match self {
            SensorReading::Accelerometer(s)
            | SensorReading::Gyroscope(s)
            | SensorReading::Magnetometer(s) => Some(s),
            SensorReading::Barometer(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_magnitude() {
        let sample = SensorSample::new(3.0, 4.0, 12.0);
        assert!((sample.magnitude() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_reading_kind() {
        let reading = SensorReading::Barometer(BarometerSample::new(1013.2, 0.0));
        assert_eq!(reading.kind(), SensorKind::Barometer);
        assert!(reading.motion().is_none());

        let reading = SensorReading::Gyroscope(SensorSample::new(0.0, 0.0, 1.0));
        assert_eq!(reading.kind(), SensorKind::Gyroscope);
        assert!(reading.motion().is_some());
    }

    #[test]
    fn test_update_interval_support() {
        assert!(SensorKind::Accelerometer.supports_update_interval());
        assert!(SensorKind::Gyroscope.supports_update_interval());
        assert!(!SensorKind::Magnetometer.supports_update_interval());
        assert!(!SensorKind::Barometer.supports_update_interval());
    }

    #[test]
    fn test_reading_json_shape() {
        let reading = SensorReading::Accelerometer(SensorSample::new(0.0, 0.0, 9.8));
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["kind"], "accelerometer");
        assert!(json["sample"]["z"].is_number());

        let back: SensorReading = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), SensorKind::Accelerometer);
    }
}
