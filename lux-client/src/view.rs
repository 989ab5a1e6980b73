//! Chat view: polling, compose, and voice wired together
//!
//! Owns the poller and the voice capture machine for one session and
//! implements the interaction rules between them: live transcripts
//! mirror into the compose field, stopping seeds the compose field, and
//! a send that races a still-running recording stops it first and waits
//! the grace period before composing the outgoing message. A finalized
//! recording is uploaded through the Upload Handler contract before
//! being attached to the message it accompanies.

use lux_common::chat::{ChatMessage, StatusEntry};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::poller::{ChatPoller, SystemPhase};
use crate::transport::{ChatTransport, TransportError};
use crate::voice::{CaptureError, Recorder, Recording, VoiceCapture, STOP_GRACE_PERIOD};

/// Chat view errors
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One owner's chat view
pub struct ChatView<R: Recorder> {
    transport: Arc<dyn ChatTransport>,
    poller: ChatPoller<Arc<dyn ChatTransport>>,
    capture: VoiceCapture<R>,
    pending_recording: Option<Recording>,
}

impl<R: Recorder> ChatView<R> {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        owner_id: impl Into<String>,
        recorder: R,
    ) -> Self {
        let poller = ChatPoller::new(transport.clone(), owner_id);
        Self {
            transport,
            poller,
            capture: VoiceCapture::new(recorder),
            pending_recording: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.poller.messages()
    }

    pub fn status_log(&self) -> &[StatusEntry] {
        self.poller.status_log()
    }

    pub fn phase(&self) -> SystemPhase {
        self.poller.phase()
    }

    pub fn is_ai_typing(&self) -> bool {
        self.poller.is_ai_typing()
    }

    pub fn compose(&self) -> &str {
        self.poller.compose()
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.poller.set_compose(text);
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }

    /// Begin voice capture; denial surfaces here and leaves it idle
    pub async fn start_recording(&mut self) -> Result<(), ViewError> {
        self.capture.start().await?;
        Ok(())
    }

    /// Mirror the latest live transcript into the compose field
    ///
    /// Called by the embedding UI while recording is active.
    pub fn refresh_live_transcript(&mut self) {
        if let Some(text) = self.capture.live_transcript() {
            self.poller.set_compose(text);
        }
    }

    /// Stop voice capture; the final transcript seeds the compose field
    /// and the recording is held for the next send
    pub async fn stop_recording(&mut self) -> Result<(), ViewError> {
        let recording = self.capture.stop().await?;
        if let Some(transcript) = &recording.transcript {
            self.poller.set_compose(transcript.clone());
        }
        self.pending_recording = Some(recording);
        Ok(())
    }

    /// Send the composed message, with any pending recording attached
    ///
    /// If recording is still running the capture is stopped first and
    /// the grace period waited out, so the finalize path can populate
    /// the transcript and audio before the message is composed.
    pub async fn send(&mut self) -> Result<(), ViewError> {
        if self.capture.is_recording() {
            self.stop_recording().await?;
            tokio::time::sleep(STOP_GRACE_PERIOD).await;
        }

        if let Some(recording) = self.pending_recording.take() {
            let file_name = format!("recording.{}", audio_extension(&recording.mime));
            let receipt = self
                .transport
                .upload(&file_name, recording.audio, recording.transcript.as_deref())
                .await?;
            self.poller.attach_audio(receipt.file_path);
        }

        self.poller.send().await?;
        Ok(())
    }

    /// One poll cycle; see [`ChatPoller::tick`]
    pub async fn tick(&mut self) -> bool {
        self.poller.tick().await
    }

    /// Poll until shutdown flips
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) {
        self.poller.run(shutdown).await
    }
}

/// File extension for an audio MIME type
fn audio_extension(mime: &str) -> &str {
    mime.rsplit('/').next().filter(|e| !e.is_empty()).unwrap_or("bin")
}
