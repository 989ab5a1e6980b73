//! Chat document serving and message intake
//!
//! The transcript and status documents are read-only from the client's
//! point of view; the message endpoint is the only mutating operation.
//! Replies never come back inline: in relay mode the external backend
//! appends them to the documents, in canned mode a background task does,
//! and either way the client sees them on its next poll tick or SSE
//! event.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lux_common::api::{ErrorResponse, SendMessageRequest, SendMessageResponse};
use lux_common::chat::{StatusEntry, TranscriptEntry};
use lux_common::events::SessionEvent;
use tracing::{error, warn};

use crate::api::identity::Identity;
use crate::responder::MessageBackend;
use crate::AppState;

/// GET /api/chat/:owner/transcript
///
/// The owner's transcript document; an absent document is an empty one.
pub async fn get_transcript(
    State(state): State<AppState>,
    identity: Identity,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<TranscriptEntry>>, ChatError> {
    require_owner(&identity, &owner_id)?;
    let entries = state.store.read_transcript(&owner_id)?;
    Ok(Json(entries))
}

/// GET /api/chat/:owner/status
///
/// The owner's status log document; an absent document is an empty one.
pub async fn get_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<StatusEntry>>, ChatError> {
    require_owner(&identity, &owner_id)?;
    let entries = state.store.read_status(&owner_id)?;
    Ok(Json(entries))
}

/// POST /api/chat/message
///
/// Accepts the message and returns 202 immediately; the AI reply arrives
/// asynchronously via the transcript document.
pub async fn send_message(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ChatError> {
    if request.text.trim().is_empty() {
        return Err(ChatError::MissingText);
    }
    require_owner(&identity, &request.user_id)?;

    match state.backend.as_ref() {
        MessageBackend::Relay(relay) => {
            relay
                .forward(&request.user_id, &request.text)
                .await
                .map_err(|e| ChatError::Backend(e.to_string()))?;
        }
        MessageBackend::Canned(responder) => {
            let owner_id = request.user_id.clone();

            let turns = state
                .store
                .append_transcript(&owner_id, [TranscriptEntry::user(request.text.clone())])?;
            state.events.broadcast_lossy(SessionEvent::TranscriptUpdated {
                owner_id: owner_id.clone(),
                turns,
            });
            append_status(&state, &owner_id, "Processing your request...")?;

            // The reply lands after a short delay, as the demo variant
            // staged it; the client observes it on a later tick
            let reply = responder.reply();
            let delay = responder.delay();
            let task_state = state.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let appended = task_state
                    .store
                    .append_transcript(&owner_id, [TranscriptEntry::model(reply)])
                    .and_then(|turns| {
                        task_state
                            .events
                            .broadcast_lossy(SessionEvent::TranscriptUpdated {
                                owner_id: owner_id.clone(),
                                turns,
                            });
                        append_status(&task_state, &owner_id, "Response generated")
                    });
                if let Err(e) = appended {
                    warn!(owner = %owner_id, "Failed to append canned reply: {}", e);
                }
            });
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse {
            message: "Task started in the background. Check the transcript for updates."
                .to_string(),
        }),
    ))
}

fn append_status(state: &AppState, owner_id: &str, text: &str) -> lux_common::Result<()> {
    let entry = StatusEntry::text(text);
    state.store.append_status(owner_id, entry.clone())?;
    state.events.broadcast_lossy(SessionEvent::StatusAppended {
        owner_id: owner_id.to_string(),
        entry,
    });
    Ok(())
}

/// Owner-scoping check shared by the chat routes
///
/// Guest callers authenticate by presenting the guest id they were
/// issued at upload time; it only has to match the resource owner.
fn require_owner(identity: &Identity, owner_id: &str) -> Result<(), ChatError> {
    match identity.as_deref() {
        Some(caller) if caller == owner_id => Ok(()),
        Some(_) => Err(ChatError::OwnerMismatch),
        None => Err(ChatError::AuthenticationRequired),
    }
}

/// Chat endpoint errors
#[derive(Debug)]
pub enum ChatError {
    MissingText,
    AuthenticationRequired,
    OwnerMismatch,
    Invalid(String),
    Backend(String),
    Storage(String),
}

impl From<lux_common::Error> for ChatError {
    fn from(e: lux_common::Error) -> Self {
        match e {
            lux_common::Error::InvalidInput(msg) => ChatError::Invalid(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ChatError::MissingText => {
                (StatusCode::BAD_REQUEST, "Text query is required".to_string())
            }
            ChatError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ChatError::OwnerMismatch => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
            ChatError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg),
            ChatError::Backend(msg) => {
                error!("Message backend failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to deliver message".to_string(),
                )
            }
            ChatError::Storage(msg) => {
                error!("Chat storage failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access chat documents".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
