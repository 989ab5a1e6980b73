//! Per-owner SSE endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lux_common::api::ErrorResponse;

use crate::api::identity::Identity;
use crate::AppState;

/// GET /api/events/:owner
///
/// Server-sent event stream scoped to one owner, carrying
/// `TranscriptUpdated` and `StatusAppended` events plus heartbeats.
/// Clients that hold this open do not need to poll the documents.
pub async fn event_stream(
    State(state): State<AppState>,
    identity: Identity,
    Path(owner_id): Path<String>,
) -> Result<Response, EventsError> {
    match identity.as_deref() {
        Some(caller) if caller == owner_id => {}
        Some(_) => return Err(EventsError::OwnerMismatch),
        None => return Err(EventsError::AuthenticationRequired),
    }

    Ok(state.events.handle_sse_connection(&owner_id).into_response())
}

/// SSE endpoint errors
#[derive(Debug)]
pub enum EventsError {
    AuthenticationRequired,
    OwnerMismatch,
}

impl IntoResponse for EventsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            EventsError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            EventsError::OwnerMismatch => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
