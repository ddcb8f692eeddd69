//! Activity statistics for the sensor layer.

pub mod log;

pub use log::{create_shared_stats, SessionStats, SharedSessionStats, StatsSnapshot};
