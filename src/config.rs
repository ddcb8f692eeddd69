//! Configuration for sensor-hooks.

use crate::hooks::{ShakeConfig, StationaryConfig, StepConfig};
use crate::media::{SpeechOptions, DEFAULT_SPEECH_LANGUAGE};
use crate::sensors::registry::{
    RegistryConfig, DEFAULT_CONSUMER_CAPACITY, DEFAULT_INTAKE_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Accelerometer update interval (milliseconds in the file)
    #[serde(with = "duration_ms_serde")]
    pub accelerometer_interval: Duration,

    /// Gyroscope update interval (milliseconds in the file)
    #[serde(with = "duration_ms_serde")]
    pub gyroscope_interval: Duration,

    /// Driver intake and per-subscriber channel sizes
    pub channels: ChannelConfig,

    /// Derived metric parameters
    pub metrics: MetricsConfig,

    /// Text-to-speech language tag
    pub speech_language: String,

    /// Base URL of the remote API
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accelerometer_interval: Duration::from_millis(100),
            gyroscope_interval: Duration::from_millis(100),
            channels: ChannelConfig::default(),
            metrics: MetricsConfig::default(),
            speech_language: DEFAULT_SPEECH_LANGUAGE.to_string(),
            api_base_url: "https://taskload-one.vercel.app".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.metrics.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensor-hooks")
            .join("config.json")
    }

    pub fn registry(&self) -> RegistryConfig {
        RegistryConfig {
            intake_capacity: self.channels.intake_capacity,
            consumer_capacity: self.channels.consumer_capacity,
        }
    }

    pub fn speech(&self) -> SpeechOptions {
        SpeechOptions::with_language(self.speech_language.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub intake_capacity: usize,
    pub consumer_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            consumer_capacity: DEFAULT_CONSUMER_CAPACITY,
        }
    }
}

/// Thresholds and time windows of the derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub shake_threshold: f64,
    pub shake_cooldown_ms: i64,
    pub step_threshold: f64,
    pub step_min_interval_ms: i64,
    pub stationary_threshold: f64,
    pub stationary_timeout_ms: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let shake = ShakeConfig::default();
        let step = StepConfig::default();
        let stationary = StationaryConfig::default();
        Self {
            shake_threshold: shake.threshold,
            shake_cooldown_ms: shake.cooldown.num_milliseconds(),
            step_threshold: step.threshold,
            step_min_interval_ms: step.min_interval.num_milliseconds(),
            stationary_threshold: stationary.threshold,
            stationary_timeout_ms: stationary.timeout.num_milliseconds(),
        }
    }
}

impl MetricsConfig {
    /// Reject time windows that cannot be represented as a non-negative duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("shake_cooldown_ms", self.shake_cooldown_ms),
            ("step_min_interval_ms", self.step_min_interval_ms),
            ("stationary_timeout_ms", self.stationary_timeout_ms),
        ];
        for (name, ms) in windows {
            if ms < 0 || chrono::Duration::try_milliseconds(ms).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "metrics.{name} must be a non-negative number of milliseconds, got {ms}"
                )));
            }
        }
        Ok(())
    }

    pub fn shake(&self) -> ShakeConfig {
        ShakeConfig {
            threshold: self.shake_threshold,
            cooldown: window(self.shake_cooldown_ms),
        }
    }

    pub fn steps(&self) -> StepConfig {
        StepConfig {
            threshold: self.step_threshold,
            min_interval: window(self.step_min_interval_ms),
        }
    }

    pub fn stationary(&self) -> StationaryConfig {
        StationaryConfig {
            threshold: self.stationary_threshold,
            timeout: window(self.stationary_timeout_ms),
        }
    }
}

/// Negative windows clamp to zero.
fn window(ms: i64) -> chrono::Duration {
    chrono::Duration::try_milliseconds(ms.max(0)).unwrap_or_else(chrono::Duration::zero)
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration as whole milliseconds.
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
