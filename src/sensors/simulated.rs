//! In-memory sensor driver.
//!
//! Used by tests, demos and the replay CLI in place of platform hardware.
//! Readings are injected through a [`SimulatedHandle`]; they only reach the
//! registry while the matching listener is live, the same as real drivers.

use crate::sensors::driver::{SampleSink, SensorDriver, SensorError};
use crate::sensors::types::{SensorKind, SensorReading};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct SimulatedState {
    sinks: HashMap<SensorKind, SampleSink>,
    intervals: HashMap<SensorKind, Duration>,
    start_counts: HashMap<SensorKind, u32>,
    stop_counts: HashMap<SensorKind, u32>,
    unavailable: HashSet<SensorKind>,
    denied: HashSet<SensorKind>,
}

fn lock(state: &Mutex<SimulatedState>) -> MutexGuard<'_, SimulatedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A driver whose "hardware" is a shared in-memory table.
#[derive(Debug, Default)]
pub struct SimulatedDriver {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for injecting readings and inspecting listener state.
    pub fn handle(&self) -> SimulatedHandle {
        SimulatedHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl SensorDriver for SimulatedDriver {
    fn start(&mut self, kind: SensorKind, sink: SampleSink) -> Result<(), SensorError> {
        let mut state = lock(&self.state);
        if state.denied.contains(&kind) {
            return Err(SensorError::PermissionDenied(kind));
        }
        if state.unavailable.contains(&kind) {
            return Err(SensorError::HardwareUnavailable(kind));
        }
        state.sinks.insert(kind, sink);
        *state.start_counts.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    fn stop(&mut self, kind: SensorKind) {
        let mut state = lock(&self.state);
        if state.sinks.remove(&kind).is_some() {
            *state.stop_counts.entry(kind).or_insert(0) += 1;
        }
    }

    fn set_update_interval(
        &mut self,
        kind: SensorKind,
        interval: Duration,
    ) -> Result<(), SensorError> {
        if !kind.supports_update_interval() {
            return Err(SensorError::IntervalUnsupported(kind));
        }
        lock(&self.state).intervals.insert(kind, interval);
        Ok(())
    }
}

/// Test-side view of a [`SimulatedDriver`].
#[derive(Debug, Clone)]
pub struct SimulatedHandle {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedHandle {
    /// Deliver a reading as the hardware would.
    ///
    /// Returns `false` when no listener is live for the reading's kind.
    pub fn emit(&self, reading: SensorReading) -> bool {
        let sink = lock(&self.state).sinks.get(&reading.kind()).cloned();
        match sink {
            Some(sink) => sink.send(reading),
            None => false,
        }
    }

    /// Whether a hardware listener is currently running for `kind`.
    pub fn is_live(&self, kind: SensorKind) -> bool {
        lock(&self.state).sinks.contains_key(&kind)
    }

    /// How many times the listener for `kind` has been started.
    pub fn start_count(&self, kind: SensorKind) -> u32 {
        lock(&self.state).start_counts.get(&kind).copied().unwrap_or(0)
    }

    /// How many times a live listener for `kind` has been stopped.
    pub fn stop_count(&self, kind: SensorKind) -> u32 {
        lock(&self.state).stop_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Last interval applied to the driver for `kind`.
    pub fn update_interval(&self, kind: SensorKind) -> Option<Duration> {
        lock(&self.state).intervals.get(&kind).copied()
    }

    /// Make future starts of `kind` fail with `HardwareUnavailable`.
    pub fn set_unavailable(&self, kind: SensorKind) {
        lock(&self.state).unavailable.insert(kind);
    }

    /// Make future starts of `kind` fail with `PermissionDenied`.
    pub fn deny_permission(&self, kind: SensorKind) {
        lock(&self.state).denied.insert(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::types::SensorSample;
    use crossbeam_channel::bounded;

    #[test]
    fn test_emit_requires_live_listener() {
        let mut driver = SimulatedDriver::new();
        let handle = driver.handle();
        let reading = SensorReading::Magnetometer(SensorSample::new(1.0, 0.0, 0.0));

        assert!(!handle.emit(reading));

        let (tx, rx) = bounded(8);
        driver
            .start(SensorKind::Magnetometer, SampleSink::new(tx))
            .unwrap();
        assert!(handle.emit(reading));
        assert_eq!(rx.try_recv().unwrap(), reading);

        driver.stop(SensorKind::Magnetometer);
        assert!(!handle.emit(reading));
        assert_eq!(handle.stop_count(SensorKind::Magnetometer), 1);
    }

    #[test]
    fn test_denied_and_unavailable() {
        let mut driver = SimulatedDriver::new();
        let handle = driver.handle();
        handle.deny_permission(SensorKind::Barometer);
        handle.set_unavailable(SensorKind::Gyroscope);

        let (tx, _rx) = bounded(1);
        assert_eq!(
            driver.start(SensorKind::Barometer, SampleSink::new(tx.clone())),
            Err(SensorError::PermissionDenied(SensorKind::Barometer))
        );
        assert_eq!(
            driver.start(SensorKind::Gyroscope, SampleSink::new(tx)),
            Err(SensorError::HardwareUnavailable(SensorKind::Gyroscope))
        );
        assert!(!handle.is_live(SensorKind::Gyroscope));
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let mut driver = SimulatedDriver::new();
        driver.stop(SensorKind::Accelerometer);
        assert_eq!(driver.handle().stop_count(SensorKind::Accelerometer), 0);
    }
}
