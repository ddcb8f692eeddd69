//! Camera, microphone and speech capabilities.
//!
//! Permission queries collapse every failure to `Denied` so permission-gated
//! UI can simply hide itself. Capture operations return typed errors so a
//! caller can tell "no permission" from "hardware gone" from a transient
//! failure. Playback and speech are fire-and-forget: errors are logged only.

use crate::media::backend::MediaBackend;
use crate::media::types::{
    CameraFacing, CameraHandle, MediaError, MediaPermission, PermissionStatus, Photo,
    RecordingHandle, SpeechOptions, Video,
};
use chrono::Utc;

pub struct MediaCapabilities<B: MediaBackend> {
    backend: B,
    speech: SpeechOptions,
}

impl<B: MediaBackend> MediaCapabilities<B> {
    pub fn new(backend: B) -> Self {
        Self::with_speech(backend, SpeechOptions::default())
    }

    /// Use `speech` as the default voice for [`speak`](Self::speak).
    pub fn with_speech(backend: B, speech: SpeechOptions) -> Self {
        Self { backend, speech }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn request(&mut self, permission: MediaPermission) -> PermissionStatus {
        match self.backend.request_permission(permission) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(%permission, error = %e, "permission request failed");
                PermissionStatus::Denied
            }
        }
    }

    fn status(&self, permission: MediaPermission) -> PermissionStatus {
        match self.backend.permission_status(permission) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(%permission, error = %e, "permission status query failed");
                PermissionStatus::Denied
            }
        }
    }

    pub fn request_camera_permission(&mut self) -> PermissionStatus {
        self.request(MediaPermission::Camera)
    }

    pub fn request_microphone_permission(&mut self) -> PermissionStatus {
        self.request(MediaPermission::Microphone)
    }

    pub fn camera_permission_status(&self) -> PermissionStatus {
        self.status(MediaPermission::Camera)
    }

    pub fn microphone_permission_status(&self) -> PermissionStatus {
        self.status(MediaPermission::Microphone)
    }

    /// Cameras on the device; empty when they cannot be listed.
    pub fn available_cameras(&self) -> Vec<CameraFacing> {
        self.backend.available_cameras().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not list cameras");
            Vec::new()
        })
    }

    fn require(&self, permission: MediaPermission) -> Result<(), MediaError> {
        if self.status(permission).is_granted() {
            Ok(())
        } else {
            Err(MediaError::PermissionDenied(permission))
        }
    }

    /// Capture a still image from a mounted camera.
    pub fn take_photo(&mut self, camera: Option<&CameraHandle>) -> Result<Photo, MediaError> {
        let camera =
            camera.ok_or_else(|| MediaError::HardwareUnavailable("no camera mounted".into()))?;
        self.require(MediaPermission::Camera)?;
        self.backend.take_picture(camera).map_err(|e| {
            tracing::warn!(camera = %camera.id, error = %e, "photo capture failed");
            e
        })
    }

    /// Record a video clip from a mounted camera.
    pub fn record_video(&mut self, camera: Option<&CameraHandle>) -> Result<Video, MediaError> {
        let camera =
            camera.ok_or_else(|| MediaError::HardwareUnavailable("no camera mounted".into()))?;
        self.require(MediaPermission::Camera)?;
        self.backend.record_video(camera).map_err(|e| {
            tracing::warn!(camera = %camera.id, error = %e, "video capture failed");
            e
        })
    }

    /// Start a microphone recording. Stop it with [`stop_recording`](Self::stop_recording).
    pub fn record_audio(&mut self) -> Result<RecordingHandle, MediaError> {
        self.require(MediaPermission::Microphone)?;
        let id = self.backend.start_recording().map_err(|e| {
            tracing::warn!(error = %e, "could not start recording");
            e
        })?;
        Ok(RecordingHandle::new(id, Utc::now()))
    }

    /// Stop a recording and return the URI of the audio file.
    pub fn stop_recording(&mut self, recording: RecordingHandle) -> Result<String, MediaError> {
        self.backend.stop_recording(recording.id()).map_err(|e| {
            tracing::warn!(recording = %recording.id(), error = %e, "could not stop recording");
            e
        })
    }

    /// Play an audio file. Errors are logged.
    pub fn play_audio(&mut self, uri: &str) {
        if let Err(e) = self.backend.play(uri) {
            tracing::warn!(uri, error = %e, "playback failed");
        }
    }

    /// Speak `text` with the default voice. Errors are logged.
    pub fn speak(&mut self, text: &str) {
        let options = self.speech.clone();
        self.speak_with(text, &options);
    }

    /// Speak `text` with explicit voice options. Errors are logged.
    pub fn speak_with(&mut self, text: &str, options: &SpeechOptions) {
        if let Err(e) = self.backend.speak(text, options) {
            tracing::warn!(language = %options.language, error = %e, "speech synthesis failed");
        }
    }
}
