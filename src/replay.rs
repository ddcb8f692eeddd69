//! Recorded and synthetic sensor sessions.
//!
//! A recording is a JSON-lines file with one [`SensorReading`] per line. The
//! CLI replays recordings through a [`SimulatedDriver`](crate::sensors::SimulatedDriver)
//! so every metric sees exactly what it would see from hardware.

use crate::hooks::{MetricSet, MetricSnapshot};
use crate::sensors::{
    BarometerSample, SensorKind, SensorReading, SensorRegistry, SensorSample, SimulatedHandle,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::f64::consts::{PI, TAU};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on readings emitted between two drains during a replay.
const REPLAY_BATCH: usize = 256;

const GRAVITY: f64 = 9.81;
const SEA_LEVEL_HPA: f64 = 1013.25;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown pattern '{0}' (expected still, walk, shake or spin)")]
    UnknownPattern(String),
}

/// Motion patterns for synthetic sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Device lying still
    Still,
    /// Walking at two steps per second while climbing slowly
    Walk,
    /// Vigorous shaking along x
    Shake,
    /// Rotating flat at 90°/s
    Spin,
}

impl FromStr for Pattern {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "still" => Ok(Pattern::Still),
            "walk" => Ok(Pattern::Walk),
            "shake" => Ok(Pattern::Shake),
            "spin" => Ok(Pattern::Spin),
            other => Err(ReplayError::UnknownPattern(other.to_string())),
        }
    }
}

/// Generate a session of `seconds` at `rate_hz`, one reading per kind per tick.
///
/// Non-finite or negative lengths produce an empty session.
pub fn synthesize(
    pattern: Pattern,
    seconds: f64,
    rate_hz: u32,
    start: DateTime<Utc>,
) -> Vec<SensorReading> {
    if !seconds.is_finite() {
        return Vec::new();
    }
    let rate_hz = rate_hz.max(1);
    let ticks = (seconds * rate_hz as f64).round().max(0.0) as u64;
    let period_us = 1_000_000 / rate_hz as i64;

    let mut readings = Vec::with_capacity(ticks as usize * SensorKind::ALL.len());
    for i in 0..ticks {
        let t = i as f64 / rate_hz as f64;
        let at = start + Duration::microseconds(period_us * i as i64);

        let (accel, gyro, heading_rad, altitude) = match pattern {
            Pattern::Still => ([0.05, -0.03, 0.2], [0.0, 0.0, 0.0], 0.0, 0.0),
            Pattern::Walk => {
                let bounce = 8.0 * (TAU * 2.0 * t).sin();
                (
                    [0.5, 0.8, GRAVITY + bounce],
                    [0.0, 0.0, 0.05],
                    0.3,
                    0.1 * t,
                )
            }
            Pattern::Shake => {
                let swing = 30.0 * (TAU * 6.0 * t).sin();
                ([swing, 2.0, GRAVITY], [0.4, 0.2, 0.1], 1.0, 0.0)
            }
            Pattern::Spin => {
                let rate = PI / 2.0;
                ([0.0, 0.0, GRAVITY], [0.0, 0.0, rate], rate * t, 0.0)
            }
        };

        readings.push(SensorReading::Accelerometer(SensorSample::at(
            accel[0], accel[1], accel[2], at,
        )));
        readings.push(SensorReading::Gyroscope(SensorSample::at(
            gyro[0], gyro[1], gyro[2], at,
        )));
        readings.push(SensorReading::Magnetometer(SensorSample::at(
            40.0 * heading_rad.cos(),
            40.0 * heading_rad.sin(),
            -30.0,
            at,
        )));
        // ~0.12 hPa per meter near sea level
        readings.push(SensorReading::Barometer(BarometerSample::at(
            SEA_LEVEL_HPA - 0.12 * altitude,
            altitude,
            at,
        )));
    }
    readings
}

/// Write readings as JSON lines.
pub fn save_recording(path: &Path, readings: &[SensorReading]) -> Result<(), ReplayError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    for reading in readings {
        serde_json::to_writer(&mut writer, reading).map_err(std::io::Error::other)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a JSON-lines recording. Blank lines are skipped.
pub fn load_recording(path: &Path) -> Result<Vec<SensorReading>, ReplayError> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut readings = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reading = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        readings.push(reading);
    }
    Ok(readings)
}

/// How many readings can be emitted into `registry` between two drains
/// without any channel filling up.
pub fn batch_size(registry: &SensorRegistry) -> usize {
    let config = registry.config();
    REPLAY_BATCH
        .min(config.intake_capacity)
        .min(config.consumer_capacity)
        .max(1)
}

/// Emit `readings` through `handle` and let `metrics` consume them.
///
/// `registry` must be the one `handle`'s driver and `metrics` belong to.
/// Readings whose kind has no live listener are skipped, like hardware
/// events nobody listens to. Returns how many readings were emitted.
pub fn replay(
    registry: &SensorRegistry,
    handle: &SimulatedHandle,
    metrics: &mut MetricSet,
    readings: &[SensorReading],
) -> usize {
    let mut emitted = 0;
    for batch in readings.chunks(batch_size(registry)) {
        emitted += batch.iter().filter(|r| handle.emit(**r)).count();
        metrics.drain();
        if let Some(last) = batch.last() {
            metrics.tick(last.timestamp());
        }
    }
    emitted
}

/// Outcome of a replayed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub readings: usize,
    pub duration_secs: f64,
    pub accel_magnitude_mean: f64,
    pub accel_magnitude_std_dev: f64,
    /// Readings lost to full consumer channels
    #[serde(default)]
    pub dropped: u64,
    pub metrics: MetricSnapshot,
}

impl ReplaySummary {
    pub fn new(readings: &[SensorReading], metrics: MetricSnapshot, dropped: u64) -> Self {
        let magnitudes: Vec<f64> = readings
            .iter()
            .filter(|r| r.kind() == SensorKind::Accelerometer)
            .filter_map(|r| r.motion().map(|s| s.magnitude()))
            .collect();

        let (mean, std_dev) = match magnitudes.len() {
            0 => (0.0, 0.0),
            1 => (magnitudes[0], 0.0),
            _ => (magnitudes.iter().mean(), magnitudes.iter().std_dev()),
        };

        let duration_secs = match (readings.first(), readings.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp() - first.timestamp()).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        };

        Self {
            readings: readings.len(),
            duration_secs,
            accel_magnitude_mean: mean,
            accel_magnitude_std_dev: std_dev,
            dropped,
            metrics,
        }
    }
}
