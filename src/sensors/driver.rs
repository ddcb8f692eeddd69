//! Platform driver seam.
//!
//! A driver owns the real hardware listeners. The registry starts a listener
//! when the first consumer of a kind subscribes and stops it when the last one
//! leaves; while a listener is live the driver pushes readings into the
//! [`SampleSink`] it was handed.

use crate::sensors::types::{SensorKind, SensorReading};
use crossbeam_channel::{Sender, TrySendError};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the sensor layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("permission denied for {0}")]
    PermissionDenied(SensorKind),
    #[error("{0} is not available on this device")]
    HardwareUnavailable(SensorKind),
    #[error("{0} does not support a configurable update interval")]
    IntervalUnsupported(SensorKind),
    #[error("sensor driver error: {0}")]
    Driver(String),
}

/// Write end of the registry intake channel.
#[derive(Debug, Clone)]
pub struct SampleSink {
    sender: Sender<SensorReading>,
}

impl SampleSink {
    pub(crate) fn new(sender: Sender<SensorReading>) -> Self {
        Self { sender }
    }

    /// Push a reading without blocking.
    ///
    /// Returns `false` when the intake is full or the registry is gone; the
    /// reading is dropped in both cases.
    pub fn send(&self, reading: SensorReading) -> bool {
        match self.sender.try_send(reading) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(kind = %reading.kind(), "sensor intake full, dropping reading");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Hardware listener management for one device.
pub trait SensorDriver: Send {
    /// Begin delivering readings of `kind` into `sink`.
    fn start(&mut self, kind: SensorKind, sink: SampleSink) -> Result<(), SensorError>;

    /// Release the hardware listener for `kind`. Must tolerate kinds that are not running.
    fn stop(&mut self, kind: SensorKind);

    /// Change the sampling cadence of a live listener.
    fn set_update_interval(
        &mut self,
        kind: SensorKind,
        interval: Duration,
    ) -> Result<(), SensorError>;
}
