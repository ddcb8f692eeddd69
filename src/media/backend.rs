//! Platform media seam.

use crate::media::types::{
    CameraFacing, CameraHandle, MediaError, MediaPermission, PermissionStatus, Photo,
    SpeechOptions, Video,
};
use uuid::Uuid;

/// Camera, microphone, playback and speech primitives of one platform.
///
/// Implementations report failures as [`MediaError`]; the policy of what to
/// do with them lives in [`MediaCapabilities`](crate::media::MediaCapabilities).
pub trait MediaBackend {
    /// Prompt for a permission. May block until the user answers.
    fn request_permission(
        &mut self,
        permission: MediaPermission,
    ) -> Result<PermissionStatus, MediaError>;

    /// Current permission state without prompting.
    fn permission_status(&self, permission: MediaPermission)
        -> Result<PermissionStatus, MediaError>;

    fn available_cameras(&self) -> Result<Vec<CameraFacing>, MediaError>;

    fn take_picture(&mut self, camera: &CameraHandle) -> Result<Photo, MediaError>;

    fn record_video(&mut self, camera: &CameraHandle) -> Result<Video, MediaError>;

    /// Start capturing microphone audio; returns an id for the recording.
    fn start_recording(&mut self) -> Result<Uuid, MediaError>;

    /// Stop and unload a recording; returns the URI of the audio file.
    fn stop_recording(&mut self, id: Uuid) -> Result<String, MediaError>;

    fn play(&mut self, uri: &str) -> Result<(), MediaError>;

    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<(), MediaError>;
}
