//! Media capabilities: camera, microphone, playback and speech.
//!
//! Independent of the sensor registry; the two share no state.

pub mod backend;
pub mod capabilities;
pub mod recorder;
pub mod simulated;
pub mod types;

pub use backend::MediaBackend;
pub use capabilities::MediaCapabilities;
pub use recorder::AudioRecorder;
pub use simulated::SimulatedMedia;
pub use types::{
    CameraFacing, CameraHandle, MediaError, MediaPermission, PermissionStatus, Photo,
    RecordingHandle, SpeechOptions, Video, DEFAULT_SPEECH_LANGUAGE,
};
