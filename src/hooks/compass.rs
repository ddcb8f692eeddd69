//! Compass heading from the magnetometer.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorError, SensorKind, SensorReading, SensorRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Heading in degrees for a horizontal field vector, in `[0, 360)`.
pub fn heading_degrees(x: f64, y: f64) -> f64 {
    let degrees = y.atan2(x).to_degrees();
    let wrapped = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    // -1e-15 + 360.0 rounds to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Sixteen-point compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinal {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl Cardinal {
    const ROSE: [Cardinal; 16] = [
        Cardinal::N,
        Cardinal::NNE,
        Cardinal::NE,
        Cardinal::ENE,
        Cardinal::E,
        Cardinal::ESE,
        Cardinal::SE,
        Cardinal::SSE,
        Cardinal::S,
        Cardinal::SSW,
        Cardinal::SW,
        Cardinal::WSW,
        Cardinal::W,
        Cardinal::WNW,
        Cardinal::NW,
        Cardinal::NNW,
    ];

    /// Nearest point of the rose; 22.5° per point.
    pub fn from_degrees(degrees: f64) -> Self {
        let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % 16;
        Self::ROSE[index]
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub degrees: f64,
    pub direction: Cardinal,
}

impl Heading {
    /// Heading for a horizontal field vector.
    pub fn from_field(x: f64, y: f64) -> Self {
        let degrees = heading_degrees(x, y);
        Self {
            degrees,
            direction: Cardinal::from_degrees(degrees),
        }
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            degrees: 0.0,
            direction: Cardinal::N,
        }
    }
}

/// Tracks the heading implied by the latest magnetometer sample.
#[derive(Debug, Clone, Default)]
pub struct CompassHeading {
    heading: Heading,
}

impl CompassHeading {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DerivedMetric for CompassHeading {
    type Output = Heading;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Magnetometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<Heading> {
        let SensorReading::Magnetometer(sample) = reading else {
            return None;
        };
        self.heading = Heading::from_field(sample.x, sample.y);
        Some(self.heading)
    }

    fn value(&self) -> Heading {
        self.heading
    }

    fn reset(&mut self) {
        self.heading = Heading::default();
    }
}

/// Read the magnetometer once and convert it to a heading.
///
/// `Ok(None)` when no sample arrives within `timeout`.
pub fn compass_heading_once(
    registry: &SensorRegistry,
    timeout: Duration,
) -> Result<Option<Heading>, SensorError> {
    let reading = registry.read_once(SensorKind::Magnetometer, timeout)?;
    Ok(match reading {
        Some(SensorReading::Magnetometer(sample)) => Some(Heading::from_field(sample.x, sample.y)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{SensorSample, SimulatedDriver};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_axis_headings() {
        assert_close(heading_degrees(1.0, 0.0), 0.0);
        assert_close(heading_degrees(0.0, 1.0), 90.0);
        assert_close(heading_degrees(-1.0, 0.0), 180.0);
        assert_close(heading_degrees(0.0, -1.0), 270.0);
    }

    #[test]
    fn test_heading_range() {
        let mut angle = 0.0_f64;
        while angle < std::f64::consts::TAU {
            let heading = heading_degrees(angle.cos() * 40.0, angle.sin() * 40.0);
            assert!((0.0..360.0).contains(&heading), "{heading} out of range");
            angle += 0.01;
        }
        assert!((0.0..360.0).contains(&heading_degrees(1.0, -1e-17)));
    }

    #[test]
    fn test_cardinal_rose() {
        assert_eq!(Cardinal::from_degrees(0.0), Cardinal::N);
        assert_eq!(Cardinal::from_degrees(11.0), Cardinal::N);
        assert_eq!(Cardinal::from_degrees(12.0), Cardinal::NNE);
        assert_eq!(Cardinal::from_degrees(90.0), Cardinal::E);
        assert_eq!(Cardinal::from_degrees(225.0), Cardinal::SW);
        assert_eq!(Cardinal::from_degrees(355.0), Cardinal::N);
    }

    #[test]
    fn test_metric_ignores_other_kinds() {
        let mut compass = CompassHeading::new();
        let accel = SensorReading::Accelerometer(SensorSample::new(0.0, 1.0, 0.0));
        assert!(compass.update(&accel).is_none());

        let mag = SensorReading::Magnetometer(SensorSample::new(0.0, 1.0, 0.0));
        let heading = compass.update(&mag).unwrap();
        assert_close(heading.degrees, 90.0);
        assert_eq!(heading.direction, Cardinal::E);

        compass.reset();
        assert_eq!(compass.value(), Heading::default());
    }

    #[test]
    fn test_heading_once_without_data() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);

        let heading = compass_heading_once(&registry, Duration::from_millis(10)).unwrap();
        assert!(heading.is_none());
        assert!(!handle.is_live(SensorKind::Magnetometer));
    }

    #[test]
    fn test_heading_once_denied() {
        let driver = SimulatedDriver::new();
        driver.handle().deny_permission(SensorKind::Magnetometer);
        let registry = SensorRegistry::new(driver);

        assert_eq!(
            compass_heading_once(&registry, Duration::from_millis(10)),
            Err(SensorError::PermissionDenied(SensorKind::Magnetometer))
        );
    }
}
