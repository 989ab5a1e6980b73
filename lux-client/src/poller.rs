//! Chat polling state machine
//!
//! Drives the chat view by re-reading the owner's transcript and status
//! documents on a fixed period and reconciling them into local state.
//! Polling only runs inside a bounded window after the user's last send,
//! so an idle view stops generating network chatter. Each reconcile is a
//! full replace of the rendered transcript, never a merge: a remote
//! document that shrank shrinks the view with it.

use lux_common::api::SendMessageRequest;
use lux_common::chat::{ChatMessage, StatusEntry, TranscriptEntry};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::transport::{ChatTransport, TransportError};

/// Fixed polling period
pub const POLL_PERIOD: Duration = Duration::from_secs(2);

/// How long polling stays alive after the user's last send
pub const ACTIVE_WINDOW: Duration = Duration::from_secs(120);

/// Greeting shown before the first reconcile replaces local state
const GREETING: &str = "Hello! I'm your Lux styling assistant. I can analyze your \
outfit and provide recommendations. What would you like to know?";

/// Observable phase of the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPhase {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Polling-based chat session for one owner
pub struct ChatPoller<T: ChatTransport> {
    transport: T,
    owner_id: String,
    messages: Vec<ChatMessage>,
    last_transcript: Vec<TranscriptEntry>,
    status_log: Vec<StatusEntry>,
    phase: SystemPhase,
    is_ai_typing: bool,
    compose: String,
    pending_audio: Option<String>,
    last_send: Option<Instant>,
}

impl<T: ChatTransport> ChatPoller<T> {
    pub fn new(transport: T, owner_id: impl Into<String>) -> Self {
        Self {
            transport,
            owner_id: owner_id.into(),
            messages: vec![ChatMessage::ai(GREETING)],
            last_transcript: Vec::new(),
            status_log: Vec::new(),
            phase: SystemPhase::Idle,
            is_ai_typing: false,
            compose: String::new(),
            pending_audio: None,
            last_send: None,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Rendered chat messages, in document order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Rendered status entries, deduplicated
    pub fn status_log(&self) -> &[StatusEntry] {
        &self.status_log
    }

    pub fn phase(&self) -> SystemPhase {
        self.phase
    }

    pub fn is_ai_typing(&self) -> bool {
        self.is_ai_typing
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    /// Mirror the compose field (typed text or live voice transcript)
    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Attach an uploaded recording to the next sent message
    pub fn attach_audio(&mut self, storage_path: impl Into<String>) {
        self.pending_audio = Some(storage_path.into());
    }

    /// Whether the bounded polling window is currently open
    pub fn window_open(&self, now: Instant) -> bool {
        self.last_send
            .map(|sent| now.duration_since(sent) < ACTIVE_WINDOW)
            .unwrap_or(false)
    }

    /// One poll cycle; returns false when skipped (window closed)
    ///
    /// A fetch failure moves the phase to `Error` and is terminal for
    /// this tick only; the next tick starts fresh.
    pub async fn tick(&mut self) -> bool {
        if !self.window_open(Instant::now()) {
            return false;
        }

        let transcript = self.transport.fetch_transcript(&self.owner_id).await;
        let status = self.transport.fetch_status(&self.owner_id).await;

        match (transcript, status) {
            (Ok(transcript), Ok(status)) => self.reconcile(transcript, status),
            (Err(e), _) | (_, Err(e)) => {
                warn!(owner = %self.owner_id, "Poll failed: {}", e);
                self.phase = SystemPhase::Error;
            }
        }
        true
    }

    /// Send the composed message
    ///
    /// Appends the message optimistically, clears the compose field, and
    /// opens the polling window. A send failure rolls the optimistic
    /// message back: nothing is shown as sent that the backend never
    /// received. No retry; the user resends.
    pub async fn send(&mut self) -> Result<(), TransportError> {
        let text = self.compose.trim().to_string();
        if text.is_empty() {
            return Ok(());
        }

        self.messages.push(ChatMessage {
            role: lux_common::chat::ChatRole::User,
            content: text.clone(),
            audio_path: self.pending_audio.clone(),
        });
        self.compose.clear();
        self.phase = SystemPhase::Processing;
        self.is_ai_typing = true;
        self.last_send = Some(Instant::now());

        let request = SendMessageRequest {
            user_id: self.owner_id.clone(),
            text,
            audio_path: self.pending_audio.take(),
        };

        match self.transport.send_message(&request).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Roll back the optimistic append
                self.messages.pop();
                self.is_ai_typing = false;
                self.phase = SystemPhase::Error;
                Err(e)
            }
        }
    }

    /// Poll until shutdown flips; dropping the view stops the timer
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(POLL_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!(owner = %self.owner_id, "Chat poller stopped");
                        break;
                    }
                }
            }
        }
    }

    fn reconcile(&mut self, transcript: Vec<TranscriptEntry>, status: Vec<StatusEntry>) {
        if transcript != self.last_transcript {
            // Full replace, not append: the remote document is
            // authoritative, including when it shrank
            self.messages = transcript.iter().map(ChatMessage::from).collect();
            self.is_ai_typing = false;
            if self.phase == SystemPhase::Processing {
                self.phase = SystemPhase::Completed;
            }
            self.last_transcript = transcript;
        }

        self.status_log = dedup_status(status);
    }
}

/// Drop deep-equal duplicates, keeping first occurrences in order
fn dedup_status(entries: Vec<StatusEntry>) -> Vec<StatusEntry> {
    let mut seen: Vec<StatusEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !seen.contains(&entry) {
            seen.push(entry);
        }
    }
    seen
}
