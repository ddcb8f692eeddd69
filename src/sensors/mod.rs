//! Sensor subscription layer.
//!
//! Drivers deliver raw readings; the registry multiplexes each hardware
//! stream to any number of subscribers with per-kind reference counts.

pub mod driver;
pub mod registry;
pub mod simulated;
pub mod types;

// Re-export commonly used types
pub use driver::{SampleSink, SensorDriver, SensorError};
pub use registry::{RegistryConfig, SensorRegistry, Subscription, SubscriptionId};
pub use simulated::{SimulatedDriver, SimulatedHandle};
pub use types::{BarometerSample, SensorKind, SensorReading, SensorSample};
