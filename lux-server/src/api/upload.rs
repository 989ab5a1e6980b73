//! Upload endpoint
//!
//! Accepts one multipart file (image, or a finalized voice recording
//! with its `transcript` text), persists it into the caller's session
//! directory, and initializes the placeholder transcript/status
//! documents. Anonymous callers get a synthesized guest identity.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lux_common::api::{ErrorResponse, STATUS_FILE, TRANSCRIPT_FILE, UploadResponse};
use tracing::error;

use crate::api::identity::Identity;
use crate::AppState;

/// POST /api/upload
///
/// Multipart fields: `file` (required), `transcript` (optional, voice
/// path). Returns the storage-relative path, the resolved owner id, and
/// the session id.
pub async fn upload(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut transcript: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Malformed(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Malformed(e.to_string()))?;
                file = Some((original_name, bytes.to_vec()));
            }
            Some("transcript") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| UploadError::Malformed(e.to_string()))?;
                if !text.is_empty() {
                    transcript = Some(text);
                }
            }
            _ => {} // Unknown fields are ignored
        }
    }

    let (original_name, bytes) = file.ok_or(UploadError::MissingFile)?;

    let receipt = state
        .store
        .create_session(identity.as_deref(), &original_name, &bytes)
        .map_err(UploadError::from)?;

    if let Some(text) = transcript {
        state
            .store
            .attach_transcript_text(&receipt.owner_id, receipt.session_id, &text)
            .map_err(UploadError::from)?;
    }

    Ok(Json(UploadResponse {
        success: true,
        file_path: receipt.file_path,
        user_id: receipt.owner_id,
        session_id: receipt.session_id,
        transcript_file: TRANSCRIPT_FILE.to_string(),
        status_file: STATUS_FILE.to_string(),
    }))
}

/// Upload endpoint errors
#[derive(Debug)]
pub enum UploadError {
    MissingFile,
    Malformed(String),
    InvalidIdentity(String),
    Storage(String),
}

impl From<lux_common::Error> for UploadError {
    fn from(e: lux_common::Error) -> Self {
        match e {
            lux_common::Error::InvalidInput(msg) => UploadError::InvalidIdentity(msg),
            other => UploadError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UploadError::MissingFile => {
                (StatusCode::BAD_REQUEST, "No file uploaded".to_string())
            }
            UploadError::Malformed(msg) => {
                (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", msg))
            }
            UploadError::InvalidIdentity(msg) => (StatusCode::BAD_REQUEST, msg),
            UploadError::Storage(msg) => {
                error!("Upload failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload file".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
