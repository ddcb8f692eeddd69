//! Types shared by the camera, microphone and speech capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default text-to-speech language.
pub const DEFAULT_SPEECH_LANGUAGE: &str = "es-MX";

/// Errors surfaced by media capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("{0} permission denied")]
    PermissionDenied(MediaPermission),
    #[error("media hardware unavailable: {0}")]
    HardwareUnavailable(String),
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("media operation failed: {0}")]
    Failed(String),
}

/// Platform permissions the media layer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPermission {
    Camera,
    Microphone,
}

impl std::fmt::Display for MediaPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaPermission::Camera => write!(f, "camera"),
            MediaPermission::Microphone => write!(f, "microphone"),
        }
    }
}

/// Outcome of a permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

/// A mounted camera view that can capture media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraHandle {
    pub id: String,
    pub facing: CameraFacing,
}

impl CameraHandle {
    pub fn new(id: impl Into<String>, facing: CameraFacing) -> Self {
        Self {
            id: id.into(),
            facing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub uri: String,
}

/// An in-progress audio recording.
///
/// Not `Clone`: exactly one owner may stop it, and stopping consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingHandle {
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl RecordingHandle {
    pub(crate) fn new(id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self { id, started_at }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Voice parameters for text-to-speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    pub language: String,
    pub pitch: f32,
    pub rate: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_SPEECH_LANGUAGE.to_string(),
            pitch: 1.0,
            rate: 1.0,
        }
    }
}

impl SpeechOptions {
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }
}
