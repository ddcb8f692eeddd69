//! Session counters for the sensor layer.
//!
//! Counts only. No sample values are kept, and nothing is written to disk.

use crate::sensors::types::SensorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Activity counters for one registry session.
#[derive(Debug)]
pub struct SessionStats {
    accelerometer_readings: AtomicU64,
    gyroscope_readings: AtomicU64,
    magnetometer_readings: AtomicU64,
    barometer_readings: AtomicU64,
    /// Readings dropped because a consumer channel was full
    dropped_readings: AtomicU64,
    /// Subscriptions handed out
    subscriptions_opened: AtomicU64,
    /// Hardware listeners started
    listeners_started: AtomicU64,
    session_id: Uuid,
    session_start: DateTime<Utc>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            accelerometer_readings: AtomicU64::new(0),
            gyroscope_readings: AtomicU64::new(0),
            magnetometer_readings: AtomicU64::new(0),
            barometer_readings: AtomicU64::new(0),
            dropped_readings: AtomicU64::new(0),
            subscriptions_opened: AtomicU64::new(0),
            listeners_started: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
        }
    }

    fn reading_counter(&self, kind: SensorKind) -> &AtomicU64 {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer_readings,
            SensorKind::Gyroscope => &self.gyroscope_readings,
            SensorKind::Magnetometer => &self.magnetometer_readings,
            SensorKind::Barometer => &self.barometer_readings,
        }
    }

    /// Record a reading taken off the driver intake.
    pub fn record_reading(&self, kind: SensorKind) {
        self.reading_counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_readings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_subscription(&self) {
        self.subscriptions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_listener_started(&self) {
        self.listeners_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Readings seen so far for one kind.
    pub fn readings(&self, kind: SensorKind) -> u64 {
        self.reading_counter(kind).load(Ordering::Relaxed)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            session_id: self.session_id,
            accelerometer_readings: self.readings(SensorKind::Accelerometer),
            gyroscope_readings: self.readings(SensorKind::Gyroscope),
            magnetometer_readings: self.readings(SensorKind::Magnetometer),
            barometer_readings: self.readings(SensorKind::Barometer),
            dropped_readings: self.dropped_readings.load(Ordering::Relaxed),
            subscriptions_opened: self.subscriptions_opened.load(Ordering::Relaxed),
            listeners_started: self.listeners_started.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics ({}):\n\
             - Accelerometer readings: {}\n\
             - Gyroscope readings: {}\n\
             - Magnetometer readings: {}\n\
             - Barometer readings: {}\n\
             - Dropped readings: {}\n\
             - Subscriptions opened: {}\n\
             - Hardware listeners started: {}\n\
             - Session duration: {} seconds",
            stats.session_id,
            stats.accelerometer_readings,
            stats.gyroscope_readings,
            stats.magnetometer_readings,
            stats.barometer_readings,
            stats.dropped_readings,
            stats.subscriptions_opened,
            stats.listeners_started,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for kind in SensorKind::ALL {
            self.reading_counter(kind).store(0, Ordering::Relaxed);
        }
        self.dropped_readings.store(0, Ordering::Relaxed);
        self.subscriptions_opened.store(0, Ordering::Relaxed);
        self.listeners_started.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub session_id: Uuid,
    pub accelerometer_readings: u64,
    pub gyroscope_readings: u64,
    pub magnetometer_readings: u64,
    pub barometer_readings: u64,
    pub dropped_readings: u64,
    pub subscriptions_opened: u64,
    pub listeners_started: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create a new shared statistics block.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}
