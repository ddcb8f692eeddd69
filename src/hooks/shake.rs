//! Shake detection from accelerometer magnitude.

use crate::hooks::DerivedMetric;
use crate::sensors::{SensorKind, SensorReading};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for shake detection.
#[derive(Debug, Clone, Copy)]
pub struct ShakeConfig {
    /// Magnitude that counts as a shake (m/s²)
    pub threshold: f64,
    /// Quiet period after a shake fires
    pub cooldown: Duration,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            threshold: 25.0,
            cooldown: Duration::milliseconds(500),
        }
    }
}

/// A shake that fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeEvent {
    pub at: DateTime<Utc>,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShakeState {
    /// Shakes fired since activation
    pub count: u64,
    pub last: Option<ShakeEvent>,
}

type ShakeCallback = Box<dyn FnMut(&ShakeEvent) + Send>;

/// Fires when acceleration magnitude exceeds the threshold, at most once per
/// cooldown window.
pub struct ShakeDetector {
    config: ShakeConfig,
    state: ShakeState,
    on_shake: Option<ShakeCallback>,
}

impl ShakeDetector {
    pub fn new() -> Self {
        Self::with_config(ShakeConfig::default())
    }

    pub fn with_config(config: ShakeConfig) -> Self {
        Self {
            config,
            state: ShakeState::default(),
            on_shake: None,
        }
    }

    /// Invoke `callback` every time a shake fires.
    pub fn on_shake(mut self, callback: impl FnMut(&ShakeEvent) + Send + 'static) -> Self {
        self.on_shake = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    fn cooled_down(&self, now: DateTime<Utc>) -> bool {
        match self.state.last {
            Some(last) => now - last.at > self.config.cooldown,
            None => true,
        }
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShakeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShakeDetector")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("has_callback", &self.on_shake.is_some())
            .finish()
    }
}

impl DerivedMetric for ShakeDetector {
    type Output = ShakeState;

    fn inputs(&self) -> &'static [SensorKind] {
        &[SensorKind::Accelerometer]
    }

    fn update(&mut self, reading: &SensorReading) -> Option<ShakeState> {
        let SensorReading::Accelerometer(sample) = reading else {
            return None;
        };

        let magnitude = sample.magnitude();
        if magnitude <= self.config.threshold || !self.cooled_down(sample.timestamp) {
            return None;
        }

        let event = ShakeEvent {
            at: sample.timestamp,
            magnitude,
        };
        self.state.count += 1;
        self.state.last = Some(event);
        if let Some(callback) = self.on_shake.as_mut() {
            callback(&event);
        }
        Some(self.state)
    }

    fn value(&self) -> ShakeState {
        self.state
    }

    fn reset(&mut self) {
        self.state = ShakeState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorSample;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn accel_at(magnitude: f64, t: DateTime<Utc>) -> SensorReading {
        SensorReading::Accelerometer(SensorSample::at(0.0, 0.0, magnitude, t))
    }

    #[test]
    fn test_fires_once_per_cooldown_window() {
        let mut detector = ShakeDetector::new();
        let t0 = Utc::now();

        // Sustained 30 m/s² sampled every 20ms for one second.
        let fired = (0..50)
            .filter_map(|i| detector.update(&accel_at(30.0, t0 + Duration::milliseconds(i * 20))))
            .count();

        // Fires at 0ms and again at the first sample past 500ms (520ms).
        assert_eq!(fired, 2);
        assert_eq!(detector.value().count, 2);
    }

    #[test]
    fn test_below_threshold_never_fires() {
        let mut detector = ShakeDetector::new();
        let t0 = Utc::now();
        for i in 0..10 {
            assert!(detector
                .update(&accel_at(25.0, t0 + Duration::seconds(i)))
                .is_none());
        }
        assert_eq!(detector.value(), ShakeState::default());
    }

    #[test]
    fn test_callback_invoked() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let mut detector = ShakeDetector::new().on_shake(move |event| {
            assert!(event.magnitude > 25.0);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let t0 = Utc::now();
        detector.update(&accel_at(40.0, t0));
        detector.update(&accel_at(40.0, t0 + Duration::milliseconds(100)));
        detector.update(&accel_at(40.0, t0 + Duration::milliseconds(700)));

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
