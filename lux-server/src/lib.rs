//! lux-server library - Lux styling session service
//!
//! HTTP service behind the photo-upload / styling-chat flow: multipart
//! upload into per-owner session directories, identity-gated preferences
//! storage, transcript/status document serving with a per-owner SSE
//! stream, and message intake (canned responder or relay to the external
//! styling backend).

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod responder;
pub mod sse;
pub mod store;

use responder::MessageBackend;
use sse::EventBroadcaster;
use store::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// File-backed per-owner session storage
    pub store: Arc<SessionStore>,
    /// Per-owner SSE fan-out
    pub events: EventBroadcaster,
    /// Message handling mode (canned or relay)
    pub backend: Arc<MessageBackend>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: SessionStore, backend: MessageBackend) -> Self {
        Self {
            store: Arc::new(store),
            events: EventBroadcaster::new(),
            backend: Arc::new(backend),
        }
    }
}

/// Largest accepted upload body
///
/// Phone camera photos routinely run past the 2 MB default body limit,
/// so the upload route carries its own.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build application router
///
/// Stored files (images, recordings) are served read-only under
/// `/files/`; the health endpoint carries no identity requirement.
pub fn build_router(state: AppState) -> Router {
    let files = ServeDir::new(state.store.data_root());

    Router::new()
        .route(
            "/api/upload",
            post(api::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/preferences",
            get(api::get_preferences).post(api::save_preferences),
        )
        .route("/api/chat/:owner/transcript", get(api::get_transcript))
        .route("/api/chat/:owner/status", get(api::get_status))
        .route("/api/chat/message", post(api::send_message))
        .route("/api/events/:owner", get(api::event_stream))
        .merge(api::health_routes())
        .nest_service("/files", files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
