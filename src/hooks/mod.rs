//! Derived metrics over live sensor streams.
//!
//! Each metric is a small accumulator updated by one reading at a time. A
//! [`MetricHook`] binds a metric to the registry for as long as it is
//! active: activation subscribes to every input kind, deactivation (or drop)
//! releases them. Metrics never share state, even when they consume the
//! same kind.

pub mod altitude;
pub mod compass;
pub mod orientation;
pub mod set;
pub mod shake;
pub mod speed;
pub mod stationary;
pub mod steps;
pub mod tilt;

use crate::sensors::{SensorError, SensorKind, SensorReading, SensorRegistry, Subscription};
use chrono::{DateTime, Utc};

pub use altitude::{Altitude, AltitudeTracker};
pub use compass::{compass_heading_once, heading_degrees, Cardinal, CompassHeading, Heading};
pub use orientation::{DeviceOrientation, OrientationReading};
pub use set::{MetricSet, MetricSnapshot};
pub use shake::{ShakeConfig, ShakeDetector, ShakeEvent, ShakeState};
pub use speed::{Motion, SpeedEstimator};
pub use stationary::{StationaryConfig, StationaryDetector};
pub use steps::{StepConfig, StepCounter};
pub use tilt::{Tilt, TiltTracker};

/// A value computed from one or more sensor streams.
pub trait DerivedMetric {
    type Output: Clone;

    /// Sensor kinds this metric consumes.
    fn inputs(&self) -> &'static [SensorKind];

    /// Fold one reading into the accumulator.
    ///
    /// Returns the value to republish, or `None` when the reading does not
    /// produce one (wrong kind, or an event that did not fire).
    fn update(&mut self, reading: &SensorReading) -> Option<Self::Output>;

    /// Current value.
    fn value(&self) -> Self::Output;

    /// Advance timers to `now`. Returns a value only when it changed.
    fn poll(&mut self, _now: DateTime<Utc>) -> Option<Self::Output> {
        None
    }

    /// Return to the initial zero state.
    fn reset(&mut self);
}

/// A metric attached to the registry for the duration of its activation.
pub struct MetricHook<M: DerivedMetric> {
    metric: M,
    registry: SensorRegistry,
    subscriptions: Vec<Subscription>,
}

impl<M: DerivedMetric> MetricHook<M> {
    /// Reset `metric` and subscribe to each of its inputs.
    ///
    /// If any subscription fails, the ones already acquired are released
    /// before the error is returned.
    pub fn activate(registry: &SensorRegistry, mut metric: M) -> Result<Self, SensorError> {
        metric.reset();
        let subscriptions = metric
            .inputs()
            .iter()
            .map(|&kind| registry.subscribe(kind))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            metric,
            registry: registry.clone(),
            subscriptions,
        })
    }

    /// Deliver every pending reading, in timestamp order.
    ///
    /// Returns each value the metric republished along the way.
    pub fn drain(&mut self) -> Vec<M::Output> {
        self.registry.pump();

        let mut readings: Vec<SensorReading> = self
            .subscriptions
            .iter()
            .flat_map(|s| s.drain())
            .collect();
        readings.sort_by_key(|r| r.timestamp());

        readings
            .iter()
            .filter_map(|r| self.metric.update(r))
            .collect()
    }

    /// Advance the metric's timers.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<M::Output> {
        self.metric.poll(now)
    }

    /// Current value of the metric.
    pub fn value(&self) -> M::Output {
        self.metric.value()
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn metric_mut(&mut self) -> &mut M {
        &mut self.metric
    }

    /// Release every subscription and hand the metric back.
    pub fn deactivate(self) -> M {
        let Self {
            metric,
            subscriptions,
            ..
        } = self;
        // Subscriptions release on drop; none may outlive this call.
        drop(subscriptions);
        metric
    }
}
