//! Preferences endpoint
//!
//! One JSON document per owner, gated by identity match between the
//! caller and the resource owner. Reads return the stored document
//! verbatim; writes overwrite it wholesale after stamping `user_id` and
//! `updated_at`. No schema validation beyond the owner check; arbitrary
//! extra fields persist as given.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lux_common::api::{ErrorResponse, GUEST_PREFIX, SaveResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::api::identity::Identity;
use crate::AppState;

/// Query parameters for GET /api/preferences
#[derive(Debug, Deserialize)]
pub struct PrefsQuery {
    /// Target owner; must equal the caller's identity
    #[serde(alias = "userId")]
    pub user_id: String,
}

/// GET /api/preferences?user_id=<id>
///
/// Returns the stored document, or 404 when the owner has never saved
/// one (the normal first-time-user signal, not a failure).
pub async fn get_preferences(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<PrefsQuery>,
) -> Result<Json<Value>, PrefsError> {
    let caller = identity
        .as_deref()
        .ok_or(PrefsError::AuthenticationRequired)?;

    if query.user_id != caller {
        return Err(PrefsError::OwnerMismatch);
    }

    let document = state.store.load_preferences(caller)?;
    Ok(Json(document))
}

/// POST /api/preferences
///
/// Body: the full preferences document. Rejected when the document's
/// declared `user_id` differs from the caller; for guest flows a
/// caller-supplied `guest-` identifier is accepted verbatim.
pub async fn save_preferences(
    State(state): State<AppState>,
    identity: Identity,
    Json(document): Json<Value>,
) -> Result<Json<SaveResponse>, PrefsError> {
    let declared = document
        .get("user_id")
        .and_then(Value::as_str)
        .ok_or(PrefsError::MissingOwnerField)?
        .to_string();

    match identity.as_deref() {
        Some(caller) if caller != declared => return Err(PrefsError::OwnerMismatch),
        Some(_) => {}
        // Guest flow: no auth session exists, the generated guest id is
        // taken at face value
        None if declared.starts_with(GUEST_PREFIX) => {}
        None => return Err(PrefsError::AuthenticationRequired),
    }

    state.store.save_preferences(&declared, document)?;

    Ok(Json(SaveResponse {
        success: true,
        message: "Preferences saved successfully".to_string(),
    }))
}

/// Preferences endpoint errors
#[derive(Debug)]
pub enum PrefsError {
    AuthenticationRequired,
    OwnerMismatch,
    MissingOwnerField,
    NotFound(String),
    Invalid(String),
    Storage(String),
}

impl From<lux_common::Error> for PrefsError {
    fn from(e: lux_common::Error) -> Self {
        match e {
            lux_common::Error::NotFound(msg) => PrefsError::NotFound(msg),
            lux_common::Error::InvalidInput(msg) => PrefsError::Invalid(msg),
            other => PrefsError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for PrefsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PrefsError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            PrefsError::OwnerMismatch => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
            PrefsError::MissingOwnerField => (
                StatusCode::BAD_REQUEST,
                "Preferences document is missing user_id".to_string(),
            ),
            PrefsError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "User preferences not found".to_string(),
            ),
            PrefsError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg),
            PrefsError::Storage(msg) => {
                error!("Preferences access failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access user preferences".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
