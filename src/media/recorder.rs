//! Audio recorder with an elapsed-time counter.

use crate::media::backend::MediaBackend;
use crate::media::capabilities::MediaCapabilities;
use crate::media::types::{MediaError, RecordingHandle};
use chrono::{DateTime, Utc};

#[derive(Debug)]
enum RecorderState {
    Idle { last_duration_secs: u64 },
    Recording(RecordingHandle),
}

/// Owns at most one recording and reports how long it has been running.
#[derive(Debug)]
pub struct AudioRecorder {
    state: RecorderState,
}

impl Default for AudioRecorder {
    fn default() -> Self {
        Self {
            state: RecorderState::Idle {
                last_duration_secs: 0,
            },
        }
    }
}

impl AudioRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording(_))
    }

    /// Whole seconds recorded as of `now`.
    ///
    /// After a stop this keeps reporting the length of the last recording.
    pub fn duration(&self, now: DateTime<Utc>) -> u64 {
        match &self.state {
            RecorderState::Idle { last_duration_secs } => *last_duration_secs,
            RecorderState::Recording(handle) => {
                (now - handle.started_at()).num_seconds().max(0) as u64
            }
        }
    }

    /// Start a new recording.
    pub fn start<B: MediaBackend>(
        &mut self,
        media: &mut MediaCapabilities<B>,
    ) -> Result<(), MediaError> {
        if self.is_recording() {
            return Err(MediaError::AlreadyRecording);
        }
        let handle = media.record_audio()?;
        self.state = RecorderState::Recording(handle);
        Ok(())
    }

    /// Stop the current recording and return its URI.
    pub fn stop<B: MediaBackend>(
        &mut self,
        media: &mut MediaCapabilities<B>,
    ) -> Result<String, MediaError> {
        let now = Utc::now();
        let last_duration_secs = self.duration(now);
        let state = std::mem::replace(&mut self.state, RecorderState::Idle { last_duration_secs });

        match state {
            RecorderState::Recording(handle) => media.stop_recording(handle),
            idle @ RecorderState::Idle { .. } => {
                self.state = idle;
                Err(MediaError::NotRecording)
            }
        }
    }
}
