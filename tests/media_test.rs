//! Integration tests for media capabilities over the simulated backend

use sensor_hooks::config::Config;
use sensor_hooks::media::{
    AudioRecorder, CameraFacing, CameraHandle, MediaCapabilities, MediaError, MediaPermission,
    PermissionStatus, SimulatedMedia,
};

#[test]
fn test_permission_prompt_then_capture() {
    let mut media = MediaCapabilities::new(SimulatedMedia::new());
    let camera = CameraHandle::new("cam-1", CameraFacing::Front);

    assert_eq!(
        media.take_photo(Some(&camera)),
        Err(MediaError::PermissionDenied(MediaPermission::Camera))
    );

    assert_eq!(media.request_camera_permission(), PermissionStatus::Granted);
    let photo = media.take_photo(Some(&camera)).unwrap();
    assert!(photo.uri.contains("cam-1"));
}

#[test]
fn test_recorder_needs_microphone() {
    let mut media =
        MediaCapabilities::new(SimulatedMedia::new().deny(MediaPermission::Microphone));
    let mut recorder = AudioRecorder::new();

    assert_eq!(media.request_microphone_permission(), PermissionStatus::Denied);
    assert_eq!(
        recorder.start(&mut media),
        Err(MediaError::PermissionDenied(MediaPermission::Microphone))
    );
    assert!(!recorder.is_recording());
}

#[test]
fn test_missing_camera_hardware() {
    let mut media = MediaCapabilities::new(SimulatedMedia::granted().without_cameras());
    assert!(media.available_cameras().is_empty());

    let camera = CameraHandle::new("cam-0", CameraFacing::Back);
    assert!(matches!(
        media.record_video(Some(&camera)),
        Err(MediaError::HardwareUnavailable(_))
    ));
}

#[test]
fn test_configured_speech_language() {
    let mut config = Config::default();
    config.speech_language = "pt-BR".to_string();

    let mut media = MediaCapabilities::with_speech(SimulatedMedia::granted(), config.speech());
    media.speak("olá");
    media.play_audio("file:///media/audio/chime.m4a");

    assert_eq!(media.backend().spoken()[0].1, "pt-BR");
    assert_eq!(media.backend().played().len(), 1);
}
