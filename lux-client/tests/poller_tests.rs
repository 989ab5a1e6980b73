//! Integration tests for the chat poller and chat view
//!
//! Exercise the state machines against an in-memory transport double:
//! bounded-window scheduling, full-replace reconciliation (including a
//! shrinking remote document), optimistic send with rollback, and the
//! voice capture paths.

use async_trait::async_trait;
use lux_client::poller::{ChatPoller, SystemPhase, ACTIVE_WINDOW};
use lux_client::transport::{ChatTransport, TransportError};
use lux_client::view::ChatView;
use lux_client::voice::{CaptureError, Recorder, Recording};
use lux_common::api::{SendMessageRequest, UploadResponse};
use lux_common::chat::{ChatRole, StatusEntry, TranscriptEntry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

#[derive(Default)]
struct FakeTransport {
    transcript: Mutex<Vec<TranscriptEntry>>,
    status: Mutex<Vec<StatusEntry>>,
    fail_sends: AtomicBool,
    fail_fetches: AtomicBool,
    sent: Mutex<Vec<SendMessageRequest>>,
    uploads: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeTransport {
    fn set_transcript(&self, entries: Vec<TranscriptEntry>) {
        *self.transcript.lock().unwrap() = entries;
    }

    fn set_status(&self, entries: Vec<StatusEntry>) {
        *self.status.lock().unwrap() = entries;
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn fetch_transcript(
        &self,
        _owner_id: &str,
    ) -> Result<Vec<TranscriptEntry>, TransportError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(self.transcript.lock().unwrap().clone())
    }

    async fn fetch_status(&self, _owner_id: &str) -> Result<Vec<StatusEntry>, TransportError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(self.status.lock().unwrap().clone())
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Api(500, "Failed to deliver message".into()));
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn upload(
        &self,
        file_name: &str,
        _bytes: Vec<u8>,
        transcript: Option<&str>,
    ) -> Result<UploadResponse, TransportError> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), transcript.map(str::to_string)));
        Ok(UploadResponse {
            success: true,
            file_path: format!("u1/{}", file_name),
            user_id: "u1".to_string(),
            session_id: Uuid::new_v4(),
            transcript_file: "chat_history.json".to_string(),
            status_file: "responses.json".to_string(),
        })
    }
}

fn poller(transport: Arc<FakeTransport>) -> ChatPoller<Arc<FakeTransport>> {
    ChatPoller::new(transport, "u1")
}

#[tokio::test]
async fn send_clears_compose_and_appends_optimistically() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport.clone());

    poller.set_compose("rate my outfit");
    poller.send().await.unwrap();

    assert_eq!(poller.compose(), "");
    let last = poller.messages().last().unwrap();
    assert_eq!(last.role, ChatRole::User);
    assert_eq!(last.content, "rate my outfit");
    assert_eq!(poller.phase(), SystemPhase::Processing);
    assert!(poller.is_ai_typing());
    assert_eq!(transport.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_compose_is_not_sent() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport.clone());

    poller.set_compose("   ");
    poller.send().await.unwrap();

    assert!(transport.sent.lock().unwrap().is_empty());
    assert_eq!(poller.phase(), SystemPhase::Idle);
}

#[tokio::test]
async fn failed_send_rolls_back_the_optimistic_message() {
    let transport = Arc::new(FakeTransport::default());
    transport.fail_sends.store(true, Ordering::SeqCst);
    let mut poller = poller(transport.clone());
    let before = poller.messages().len();

    poller.set_compose("rate my outfit");
    let result = poller.send().await;

    assert!(result.is_err());
    // Nothing shows as sent when the backend never received it
    assert_eq!(poller.messages().len(), before);
    assert_eq!(poller.phase(), SystemPhase::Error);
    assert!(!poller.is_ai_typing());
}

#[tokio::test]
async fn tick_is_skipped_outside_the_active_window() {
    let transport = Arc::new(FakeTransport::default());
    transport.set_transcript(vec![TranscriptEntry::user("hello")]);
    let mut poller = poller(transport);

    // No send yet: window closed, nothing fetched
    assert!(!poller.tick().await);
    assert_eq!(poller.messages().len(), 1); // greeting only
}

#[tokio::test]
async fn window_opens_on_send_and_expires() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport);

    poller.set_compose("hi");
    poller.send().await.unwrap();

    let now = Instant::now();
    assert!(poller.window_open(now));
    assert!(!poller.window_open(now + ACTIVE_WINDOW));
}

#[tokio::test]
async fn reconcile_replaces_wholesale_and_shrinks_with_the_remote() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport.clone());

    poller.set_compose("first");
    poller.send().await.unwrap();

    transport.set_transcript(vec![
        TranscriptEntry::user("first"),
        TranscriptEntry::model("reply one"),
        TranscriptEntry::model("reply two"),
    ]);
    assert!(poller.tick().await);
    assert_eq!(poller.messages().len(), 3);
    assert_eq!(poller.phase(), SystemPhase::Completed);
    assert!(!poller.is_ai_typing());

    // Remote document shrank: the rendered list shrinks to match
    transport.set_transcript(vec![TranscriptEntry::user("first")]);
    assert!(poller.tick().await);
    assert_eq!(poller.messages().len(), 1);
    assert_eq!(poller.messages()[0].content, "first");
}

#[tokio::test]
async fn fetch_failure_moves_the_phase_to_error() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport.clone());

    poller.set_compose("hi");
    poller.send().await.unwrap();

    transport.fail_fetches.store(true, Ordering::SeqCst);
    assert!(poller.tick().await);
    assert_eq!(poller.phase(), SystemPhase::Error);

    // Next tick recovers once fetches succeed again
    transport.fail_fetches.store(false, Ordering::SeqCst);
    transport.set_transcript(vec![TranscriptEntry::user("hi")]);
    assert!(poller.tick().await);
    assert_eq!(poller.messages().len(), 1);
}

#[tokio::test]
async fn status_entries_are_deduplicated_before_render() {
    let transport = Arc::new(FakeTransport::default());
    let mut poller = poller(transport.clone());

    poller.set_compose("hi");
    poller.send().await.unwrap();

    transport.set_status(vec![
        StatusEntry::text("Analyzing your closet"),
        StatusEntry::text("Analyzing your closet"),
        StatusEntry::Links(vec!["https://a.example".into()]),
    ]);
    assert!(poller.tick().await);
    assert_eq!(poller.status_log().len(), 2);
}

// Voice capture paths, driven through the chat view

struct FakeRecorder {
    live: Arc<Mutex<Option<String>>>,
    final_transcript: Option<String>,
}

impl FakeRecorder {
    fn with_transcript(text: &str) -> Self {
        Self {
            live: Arc::new(Mutex::new(Some(text.to_string()))),
            final_transcript: Some(text.to_string()),
        }
    }
}

#[async_trait]
impl Recorder for FakeRecorder {
    async fn start(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<Recording, CaptureError> {
        Ok(Recording {
            audio: vec![0x1a, 0x45, 0xdf, 0xa3],
            mime: "audio/webm".to_string(),
            transcript: self.final_transcript.clone(),
        })
    }

    fn live_transcript(&self) -> Option<String> {
        self.live.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn stopping_seeds_compose_and_attaches_audio_to_the_next_send() {
    let transport = Arc::new(FakeTransport::default());
    let recorder = FakeRecorder::with_transcript("How would you rate my outfit style?");
    let mut view = ChatView::new(transport.clone(), "u1", recorder);

    view.start_recording().await.unwrap();
    view.refresh_live_transcript();
    assert_eq!(view.compose(), "How would you rate my outfit style?");

    view.stop_recording().await.unwrap();
    view.send().await.unwrap();

    let uploads = transport.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "recording.webm");
    assert_eq!(
        uploads[0].1.as_deref(),
        Some("How would you rate my outfit style?")
    );

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "How would you rate my outfit style?");
    assert_eq!(sent[0].audio_path.as_deref(), Some("u1/recording.webm"));
}

#[tokio::test]
async fn send_while_recording_stops_capture_first() {
    let transport = Arc::new(FakeTransport::default());
    let recorder = FakeRecorder::with_transcript("voice message");
    let mut view = ChatView::new(transport.clone(), "u1", recorder);

    view.start_recording().await.unwrap();
    assert!(view.is_recording());

    // Send before stop: the view stops the recorder, waits out the
    // grace period, and composes from the finalized transcript
    view.send().await.unwrap();

    assert!(!view.is_recording());
    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "voice message");
    assert!(sent[0].audio_path.is_some());
}
