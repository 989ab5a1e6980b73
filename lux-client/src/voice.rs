//! Voice capture state machine
//!
//! Wraps a platform recorder (microphone plus best-effort speech-to-text)
//! behind a trait so the state machine is testable without hardware.
//! Starting fails closed: a denied microphone leaves the machine `Idle`
//! with the error surfaced. While recording, the live transcript mirrors
//! into the chat compose field; stopping finalizes the audio and seeds
//! the compose field with whatever transcript was produced.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Wait after a forced stop for the finalize path to settle, when the
/// user hits send while recording is still running
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// Voice capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Microphone access denied: {0}")]
    AccessDenied(String),

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error("Not recording")]
    NotRecording,
}

/// A finalized recording
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub audio: Vec<u8>,
    /// MIME type of the audio container, e.g. `audio/webm`
    pub mime: String,
    /// Final transcript, when speech-to-text was available
    pub transcript: Option<String>,
}

/// Platform recorder seam
#[async_trait]
pub trait Recorder: Send {
    /// Request microphone access and begin buffering audio chunks
    async fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop capture and finalize the buffered audio
    async fn stop(&mut self) -> Result<Recording, CaptureError>;

    /// Latest live transcript, if the runtime supports streaming
    /// speech-to-text; None otherwise
    fn live_transcript(&self) -> Option<String>;
}

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
}

/// Microphone capture with live transcript mirroring
pub struct VoiceCapture<R: Recorder> {
    recorder: R,
    state: CaptureState,
}

impl<R: Recorder> VoiceCapture<R> {
    pub fn new(recorder: R) -> Self {
        Self {
            recorder,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Begin recording; any denial surfaces the error and stays `Idle`
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        match self.recorder.start().await {
            Ok(()) => {
                self.state = CaptureState::Recording;
                debug!("Voice capture started");
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Idle;
                Err(e)
            }
        }
    }

    /// Live transcript to mirror into the compose field
    pub fn live_transcript(&self) -> Option<String> {
        if self.state == CaptureState::Recording {
            self.recorder.live_transcript()
        } else {
            None
        }
    }

    /// Stop and finalize the recording
    pub async fn stop(&mut self) -> Result<Recording, CaptureError> {
        if self.state != CaptureState::Recording {
            return Err(CaptureError::NotRecording);
        }
        let recording = self.recorder.stop().await?;
        self.state = CaptureState::Idle;
        debug!(
            bytes = recording.audio.len(),
            transcribed = recording.transcript.is_some(),
            "Voice capture finalized"
        );
        Ok(recording)
    }
}
