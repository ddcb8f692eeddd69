//! In-memory media backend for tests and the CLI.

use crate::media::backend::MediaBackend;
use crate::media::types::{
    CameraFacing, CameraHandle, MediaError, MediaPermission, PermissionStatus, Photo,
    SpeechOptions, Video,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A backend that answers from tables instead of hardware.
///
/// Permissions start `Undetermined` and become `Granted` when requested,
/// unless explicitly denied.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    permissions: HashMap<MediaPermission, PermissionStatus>,
    denied: HashSet<MediaPermission>,
    failing_queries: bool,
    speech_available: bool,
    cameras: Vec<CameraFacing>,
    recordings: HashSet<Uuid>,
    spoken: Vec<(String, String)>,
    played: Vec<String>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self {
            permissions: HashMap::new(),
            denied: HashSet::new(),
            failing_queries: false,
            speech_available: true,
            cameras: vec![CameraFacing::Front, CameraFacing::Back],
            recordings: HashSet::new(),
            spoken: Vec::new(),
            played: Vec::new(),
        }
    }
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every permission already granted.
    pub fn granted() -> Self {
        let mut media = Self::default();
        media
            .permissions
            .insert(MediaPermission::Camera, PermissionStatus::Granted);
        media
            .permissions
            .insert(MediaPermission::Microphone, PermissionStatus::Granted);
        media
    }

    /// Deny `permission` now and on every future request.
    pub fn deny(mut self, permission: MediaPermission) -> Self {
        self.denied.insert(permission);
        self.permissions
            .insert(permission, PermissionStatus::Denied);
        self
    }

    /// Make permission requests and queries error out.
    pub fn fail_permission_queries(mut self) -> Self {
        self.failing_queries = true;
        self
    }

    /// Remove the speech engine.
    pub fn without_speech(mut self) -> Self {
        self.speech_available = false;
        self
    }

    /// Remove every camera.
    pub fn without_cameras(mut self) -> Self {
        self.cameras.clear();
        self
    }

    /// Recordings started and not yet stopped.
    pub fn active_recordings(&self) -> Vec<Uuid> {
        self.recordings.iter().copied().collect()
    }

    /// Every utterance as `(text, language)`.
    pub fn spoken(&self) -> &[(String, String)] {
        &self.spoken
    }

    pub fn played(&self) -> &[String] {
        &self.played
    }

    fn camera_present(&self, camera: &CameraHandle) -> Result<(), MediaError> {
        if self.cameras.contains(&camera.facing) {
            Ok(())
        } else {
            Err(MediaError::HardwareUnavailable(format!(
                "no {:?} camera",
                camera.facing
            )))
        }
    }
}

impl MediaBackend for SimulatedMedia {
    fn request_permission(
        &mut self,
        permission: MediaPermission,
    ) -> Result<PermissionStatus, MediaError> {
        if self.failing_queries {
            return Err(MediaError::Failed("permission service unavailable".into()));
        }
        let status = if self.denied.contains(&permission) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        };
        self.permissions.insert(permission, status);
        Ok(status)
    }

    fn permission_status(
        &self,
        permission: MediaPermission,
    ) -> Result<PermissionStatus, MediaError> {
        if self.failing_queries {
            return Err(MediaError::Failed("permission service unavailable".into()));
        }
        Ok(self
            .permissions
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::Undetermined))
    }

    fn available_cameras(&self) -> Result<Vec<CameraFacing>, MediaError> {
        Ok(self.cameras.clone())
    }

    fn take_picture(&mut self, camera: &CameraHandle) -> Result<Photo, MediaError> {
        self.camera_present(camera)?;
        Ok(Photo {
            uri: format!("file:///media/{}/{}.jpg", camera.id, Uuid::new_v4()),
            width: 1920,
            height: 1080,
        })
    }

    fn record_video(&mut self, camera: &CameraHandle) -> Result<Video, MediaError> {
        self.camera_present(camera)?;
        Ok(Video {
            uri: format!("file:///media/{}/{}.mp4", camera.id, Uuid::new_v4()),
        })
    }

    fn start_recording(&mut self) -> Result<Uuid, MediaError> {
        let id = Uuid::new_v4();
        self.recordings.insert(id);
        Ok(id)
    }

    fn stop_recording(&mut self, id: Uuid) -> Result<String, MediaError> {
        if self.recordings.remove(&id) {
            Ok(format!("file:///media/audio/{id}.m4a"))
        } else {
            Err(MediaError::NotRecording)
        }
    }

    fn play(&mut self, uri: &str) -> Result<(), MediaError> {
        self.played.push(uri.to_string());
        Ok(())
    }

    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<(), MediaError> {
        if !self.speech_available {
            return Err(MediaError::HardwareUnavailable("no speech engine".into()));
        }
        self.spoken
            .push((text.to_string(), options.language.clone()));
        Ok(())
    }
}
