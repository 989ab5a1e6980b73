//! Shared API request/response types
//!
//! Wire shapes used by both lux-server handlers and the lux-client flow.
//! Caller identity travels in the `X-User-Id` header; the constant lives
//! here so the two sides cannot drift.

use serde::{Deserialize, Serialize};

/// Request header carrying the authenticated caller identity
pub const USER_ID_HEADER: &str = "x-user-id";

/// Prefix of synthesized guest identities (`guest-<uuid>`)
pub const GUEST_PREFIX: &str = "guest-";

/// Conventional file name of the per-owner transcript document
pub const TRANSCRIPT_FILE: &str = "chat_history.json";

/// Conventional file name of the per-owner status log document
pub const STATUS_FILE: &str = "responses.json";

/// Response to a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Storage-relative path of the stored file, e.g. `u1/<uuid>.png`
    pub file_path: String,
    /// Resolved owner identity (authenticated id or `guest-<uuid>`)
    pub user_id: String,
    /// Identifier of the session created by this upload
    pub session_id: uuid::Uuid,
    /// Names of the placeholder documents initialized alongside the file
    pub transcript_file: String,
    pub status_file: String,
}

/// Response to a successful preferences save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

/// Body of POST /api/chat/message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Owner whose transcript the message belongs to
    pub user_id: String,
    pub text: String,
    /// Storage-relative path of an uploaded voice recording, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
}

/// Acknowledgement of an accepted message
///
/// The AI reply is never returned inline; it arrives asynchronously via
/// the polled or streamed transcript document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: String,
}

/// Error body shared by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
