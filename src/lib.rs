//! Sensor Hooks - device sensor access and derived motion metrics.
//!
//! This library wraps four device sensors (accelerometer, gyroscope,
//! magnetometer, barometer) behind a reference-counted registry and computes
//! derived metrics from their streams: compass heading, shake and step
//! detection, tilt, altitude, stationary detection, speed and orientation.
//! A separate media layer exposes camera, microphone, playback and speech.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Sensor Hooks                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐    │
//! │  │   Driver    │──▶│  Registry   │──▶│  Subscriptions   │    │
//! │  │ (platform)  │   │ (refcounts) │   │ (one per hook)   │    │
//! │  └─────────────┘   └─────────────┘   └──────────────────┘    │
//! │                           │                   │              │
//! │                           ▼                   ▼              │
//! │                    ┌─────────────┐   ┌──────────────────┐    │
//! │                    │   Session   │   │  Derived metrics │    │
//! │                    │    Stats    │   │  (MetricHook)    │    │
//! │                    └─────────────┘   └──────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sensor_hooks::hooks::{CompassHeading, MetricHook};
//! use sensor_hooks::sensors::{SensorReading, SensorRegistry, SensorSample, SimulatedDriver};
//!
//! let driver = SimulatedDriver::new();
//! let handle = driver.handle();
//! let registry = SensorRegistry::new(driver);
//!
//! let mut compass = MetricHook::activate(&registry, CompassHeading::new()).unwrap();
//! handle.emit(SensorReading::Magnetometer(SensorSample::new(0.0, 30.0, -20.0)));
//! compass.drain();
//! assert!((compass.value().degrees - 90.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod hooks;
pub mod media;
pub mod replay;
pub mod sensors;
pub mod stats;

#[cfg(feature = "api")]
pub mod api;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, MetricsConfig};
pub use hooks::{DerivedMetric, MetricHook, MetricSet, MetricSnapshot};
pub use media::{MediaBackend, MediaCapabilities, MediaError};
pub use replay::{Pattern, ReplayError, ReplaySummary};
pub use sensors::{
    SensorDriver, SensorError, SensorKind, SensorReading, SensorRegistry, Subscription,
};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};

#[cfg(feature = "api")]
pub use api::{ApiClient, ApiConfig, ApiError, BlockingApiClient};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
