//! Reference-counted sensor subscriptions.
//!
//! The registry keeps one slot per [`SensorKind`]. Each slot multiplexes a
//! single hardware listener to any number of consumers: the listener is
//! started when the first consumer subscribes and stopped when the last one
//! is released. Readings travel from the driver into a shared intake channel
//! and are fanned out to consumer channels by [`SensorRegistry::pump`].

use crate::sensors::driver::{SampleSink, SensorDriver, SensorError};
use crate::sensors::types::{SensorKind, SensorReading};
use crate::stats::{create_shared_stats, SharedSessionStats};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

/// Default capacity of the driver intake channel.
pub const DEFAULT_INTAKE_CAPACITY: usize = 10_000;

/// Default capacity of each consumer channel.
pub const DEFAULT_CONSUMER_CAPACITY: usize = 1_024;

/// Identifies one consumer of one sensor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Channel sizing for a registry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    pub intake_capacity: usize,
    pub consumer_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            consumer_capacity: DEFAULT_CONSUMER_CAPACITY,
        }
    }
}

struct Consumer {
    id: SubscriptionId,
    sender: Sender<SensorReading>,
}

#[derive(Default)]
struct Slot {
    consumers: Vec<Consumer>,
    /// Interval requested by callers; applied whenever the listener starts
    interval: Option<Duration>,
    live: bool,
}

struct RegistryInner {
    driver: Box<dyn SensorDriver>,
    slots: HashMap<SensorKind, Slot>,
    next_id: u64,
    intake_tx: Sender<SensorReading>,
    consumer_capacity: usize,
}

impl RegistryInner {
    fn slot(&mut self, kind: SensorKind) -> &mut Slot {
        self.slots.entry(kind).or_default()
    }

    /// Remove one consumer, stopping the listener if it was the last.
    fn release(&mut self, kind: SensorKind, id: SubscriptionId) -> bool {
        let slot = self.slot(kind);
        let before = slot.consumers.len();
        slot.consumers.retain(|c| c.id != id);
        let removed = slot.consumers.len() != before;

        if removed {
            tracing::debug!(%kind, %id, remaining = slot.consumers.len(), "released subscription");
        }
        if slot.consumers.is_empty() && slot.live {
            slot.live = false;
            self.driver.stop(kind);
            tracing::debug!(%kind, "stopped hardware listener");
        }
        removed
    }

    /// Remove every consumer of `kind` and stop its listener.
    fn release_kind(&mut self, kind: SensorKind) -> usize {
        let slot = self.slot(kind);
        let released = slot.consumers.len();
        slot.consumers.clear();
        if slot.live {
            slot.live = false;
            self.driver.stop(kind);
            tracing::debug!(%kind, released, "stopped hardware listener");
        }
        released
    }
}

fn lock(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of every hardware listener on the device.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct SensorRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    intake: Receiver<SensorReading>,
    config: RegistryConfig,
    stats: SharedSessionStats,
}

impl SensorRegistry {
    /// Create a registry over `driver` with default channel sizes.
    pub fn new(driver: impl SensorDriver + 'static) -> Self {
        Self::with_config(driver, RegistryConfig::default())
    }

    pub fn with_config(driver: impl SensorDriver + 'static, config: RegistryConfig) -> Self {
        let config = RegistryConfig {
            intake_capacity: config.intake_capacity.max(1),
            consumer_capacity: config.consumer_capacity.max(1),
        };
        let (intake_tx, intake) = bounded(config.intake_capacity);
        let inner = RegistryInner {
            driver: Box::new(driver),
            slots: HashMap::new(),
            next_id: 1,
            intake_tx,
            consumer_capacity: config.consumer_capacity,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            intake,
            config,
            stats: create_shared_stats(),
        }
    }

    /// Channel sizes in effect.
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Add a consumer for `kind`, starting the hardware listener if needed.
    ///
    /// Failures are logged and returned; nothing is registered on error.
    pub fn subscribe(&self, kind: SensorKind) -> Result<Subscription, SensorError> {
        let mut inner = lock(&self.inner);

        if !inner.slot(kind).live {
            let sink = SampleSink::new(inner.intake_tx.clone());
            if let Err(e) = inner.driver.start(kind, sink) {
                tracing::warn!(%kind, error = %e, "could not start sensor");
                return Err(e);
            }
            self.stats.record_listener_started();
            tracing::debug!(%kind, "started hardware listener");

            if let Some(interval) = inner.slot(kind).interval {
                if let Err(e) = inner.driver.set_update_interval(kind, interval) {
                    tracing::warn!(%kind, error = %e, "could not apply update interval");
                }
            }
            inner.slot(kind).live = true;
        }

        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;

        let (sender, receiver) = bounded(inner.consumer_capacity);
        let slot = inner.slot(kind);
        slot.consumers.push(Consumer { id, sender });
        tracing::debug!(%kind, %id, consumers = slot.consumers.len(), "subscribed");
        self.stats.record_subscription();

        Ok(Subscription {
            id,
            kind,
            receiver,
            registry: Arc::downgrade(&self.inner),
            released: false,
        })
    }

    /// Release one consumer. Equivalent to dropping the subscription.
    pub fn unsubscribe(&self, subscription: Subscription) {
        subscription.unsubscribe();
    }

    /// Release every consumer of `kind`. No-op when there are none.
    pub fn unsubscribe_kind(&self, kind: SensorKind) {
        lock(&self.inner).release_kind(kind);
    }

    /// Set the sampling cadence for `kind`.
    ///
    /// Only accelerometer and gyroscope accept an interval. The value is kept
    /// and re-applied whenever the listener starts, so calling this before
    /// anyone subscribes configures the next subscription.
    pub fn set_update_interval(
        &self,
        kind: SensorKind,
        interval: Duration,
    ) -> Result<(), SensorError> {
        if !kind.supports_update_interval() {
            return Err(SensorError::IntervalUnsupported(kind));
        }

        let mut inner = lock(&self.inner);
        inner.slot(kind).interval = Some(interval);
        if inner.slot(kind).live {
            inner.driver.set_update_interval(kind, interval).map_err(|e| {
                tracing::warn!(%kind, error = %e, "could not apply update interval");
                e
            })?;
        }
        Ok(())
    }

    /// Interval stored for `kind`, if one was set.
    pub fn update_interval(&self, kind: SensorKind) -> Option<Duration> {
        lock(&self.inner).slots.get(&kind).and_then(|s| s.interval)
    }

    /// Release every kind. Safe to call any number of times.
    pub fn cleanup_all(&self) {
        let mut inner = lock(&self.inner);
        for kind in SensorKind::ALL {
            inner.release_kind(kind);
        }
    }

    /// Number of live consumers of `kind`.
    pub fn ref_count(&self, kind: SensorKind) -> usize {
        lock(&self.inner)
            .slots
            .get(&kind)
            .map(|s| s.consumers.len())
            .unwrap_or(0)
    }

    /// Whether the hardware listener for `kind` is running.
    pub fn is_active(&self, kind: SensorKind) -> bool {
        lock(&self.inner)
            .slots
            .get(&kind)
            .map(|s| s.live)
            .unwrap_or(false)
    }

    /// Fan out every reading waiting in the intake.
    ///
    /// Returns how many readings were taken off the intake. Readings of a
    /// kind nobody consumes any more are discarded.
    pub fn pump(&self) -> usize {
        let pending: Vec<SensorReading> = self.intake.try_iter().collect();
        if pending.is_empty() {
            return 0;
        }
        self.dispatch(&pending);
        pending.len()
    }

    /// Wait up to `timeout` for a reading, then fan out everything pending.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.intake.recv_timeout(timeout) {
            Ok(first) => {
                let mut pending = vec![first];
                pending.extend(self.intake.try_iter());
                self.dispatch(&pending);
                pending.len()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn dispatch(&self, readings: &[SensorReading]) {
        let mut inner = lock(&self.inner);
        for reading in readings {
            let kind = reading.kind();
            self.stats.record_reading(kind);

            let slot = inner.slot(kind);
            slot.consumers
                .retain(|consumer| match consumer.sender.try_send(*reading) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        self.stats.record_dropped();
                        true
                    }
                    Err(TrySendError::Disconnected(_)) => false,
                });
        }
    }

    /// Take a single reading of `kind`, waiting at most `timeout`.
    ///
    /// Holds a subscription only for the duration of the call, so a listener
    /// started here is stopped again before returning. `Ok(None)` means no
    /// reading arrived in time.
    pub fn read_once(
        &self,
        kind: SensorKind,
        timeout: Duration,
    ) -> Result<Option<SensorReading>, SensorError> {
        let subscription = self.subscribe(kind)?;
        let deadline = Instant::now() + timeout;

        loop {
            self.pump();
            if let Some(reading) = subscription.try_recv() {
                return Ok(Some(reading));
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(%kind, "no reading before timeout");
                return Ok(None);
            }
            self.pump_timeout(deadline - now);
        }
    }

    /// Activity counters for this registry.
    pub fn stats(&self) -> &SharedSessionStats {
        &self.stats
    }
}

impl fmt::Debug for SensorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in SensorKind::ALL {
            map.entry(&kind, &self.ref_count(kind));
        }
        map.finish()
    }
}

/// A consumer's share of one sensor stream.
///
/// Dropping the subscription releases it; the hardware listener stops once
/// the last subscription of its kind is gone.
pub struct Subscription {
    id: SubscriptionId,
    kind: SensorKind,
    receiver: Receiver<SensorReading>,
    registry: Weak<Mutex<RegistryInner>>,
    released: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Next delivered reading, if any.
    pub fn try_recv(&self) -> Option<SensorReading> {
        self.receiver.try_recv().ok()
    }

    /// Every reading delivered so far.
    pub fn drain(&self) -> Vec<SensorReading> {
        self.receiver.try_iter().collect()
    }

    /// Release this consumer now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(inner) = self.registry.upgrade() {
            lock(&inner).release(self.kind, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::simulated::SimulatedDriver;
    use crate::sensors::types::SensorSample;

    fn accel(z: f64) -> SensorReading {
        SensorReading::Accelerometer(SensorSample::new(0.0, 0.0, z))
    }

    #[test]
    fn test_listener_follows_reference_count() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);

        let first = registry.subscribe(SensorKind::Accelerometer).unwrap();
        let second = registry.subscribe(SensorKind::Accelerometer).unwrap();
        assert_eq!(registry.ref_count(SensorKind::Accelerometer), 2);
        assert_eq!(handle.start_count(SensorKind::Accelerometer), 1);

        drop(first);
        assert!(handle.is_live(SensorKind::Accelerometer));

        second.unsubscribe();
        assert!(!handle.is_live(SensorKind::Accelerometer));
        assert!(!registry.is_active(SensorKind::Accelerometer));
        assert_eq!(handle.stop_count(SensorKind::Accelerometer), 1);
    }

    #[test]
    fn test_pump_fans_out_to_every_consumer() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);

        let a = registry.subscribe(SensorKind::Accelerometer).unwrap();
        let b = registry.subscribe(SensorKind::Accelerometer).unwrap();

        assert!(handle.emit(accel(9.8)));
        assert!(handle.emit(accel(9.7)));
        assert_eq!(registry.pump(), 2);

        assert_eq!(a.drain().len(), 2);
        assert_eq!(b.drain().len(), 2);
        assert_eq!(registry.stats().readings(SensorKind::Accelerometer), 2);
    }

    #[test]
    fn test_failed_start_registers_nothing() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        handle.deny_permission(SensorKind::Magnetometer);
        let registry = SensorRegistry::new(driver);

        let err = registry.subscribe(SensorKind::Magnetometer).unwrap_err();
        assert_eq!(err, SensorError::PermissionDenied(SensorKind::Magnetometer));
        assert_eq!(registry.ref_count(SensorKind::Magnetometer), 0);
        assert!(!registry.is_active(SensorKind::Magnetometer));
    }

    #[test]
    fn test_interval_applies_to_next_subscription() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);

        registry
            .set_update_interval(SensorKind::Gyroscope, Duration::from_millis(20))
            .unwrap();
        assert_eq!(handle.update_interval(SensorKind::Gyroscope), None);

        let _sub = registry.subscribe(SensorKind::Gyroscope).unwrap();
        assert_eq!(
            handle.update_interval(SensorKind::Gyroscope),
            Some(Duration::from_millis(20))
        );

        registry
            .set_update_interval(SensorKind::Gyroscope, Duration::from_millis(100))
            .unwrap();
        assert_eq!(
            handle.update_interval(SensorKind::Gyroscope),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_interval_rejected_for_barometer() {
        let registry = SensorRegistry::new(SimulatedDriver::new());
        assert_eq!(
            registry.set_update_interval(SensorKind::Barometer, Duration::from_millis(50)),
            Err(SensorError::IntervalUnsupported(SensorKind::Barometer))
        );
    }

    #[test]
    fn test_full_consumer_drops_instead_of_blocking() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::with_config(
            driver,
            RegistryConfig {
                intake_capacity: 16,
                consumer_capacity: 1,
            },
        );

        let sub = registry.subscribe(SensorKind::Accelerometer).unwrap();
        handle.emit(accel(1.0));
        handle.emit(accel(2.0));
        registry.pump();

        assert_eq!(sub.drain().len(), 1);
        assert_eq!(registry.stats().stats().dropped_readings, 1);
    }

    #[test]
    fn test_read_once_times_out_and_releases() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);

        let reading = registry
            .read_once(SensorKind::Gyroscope, Duration::from_millis(20))
            .unwrap();
        assert!(reading.is_none());
        assert_eq!(handle.start_count(SensorKind::Gyroscope), 1);
        assert!(!handle.is_live(SensorKind::Gyroscope));
        assert_eq!(registry.ref_count(SensorKind::Gyroscope), 0);
    }

    #[test]
    fn test_read_once_shares_a_running_listener() {
        let driver = SimulatedDriver::new();
        let handle = driver.handle();
        let registry = SensorRegistry::new(driver);
        let existing = registry.subscribe(SensorKind::Accelerometer).unwrap();

        handle.emit(accel(9.81));
        let reading = registry
            .read_once(SensorKind::Accelerometer, Duration::from_millis(100))
            .unwrap();
        assert!(matches!(
            reading,
            Some(SensorReading::Accelerometer(sample)) if sample.z == 9.81
        ));

        assert!(handle.is_live(SensorKind::Accelerometer));
        assert_eq!(handle.stop_count(SensorKind::Accelerometer), 0);
        assert_eq!(registry.ref_count(SensorKind::Accelerometer), 1);
        assert_eq!(existing.drain().len(), 1);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = SensorRegistry::new(SimulatedDriver::new());
        let sub = registry.subscribe(SensorKind::Barometer).unwrap();
        drop(registry);
        assert!(sub.try_recv().is_none());
        drop(sub);
    }
}
