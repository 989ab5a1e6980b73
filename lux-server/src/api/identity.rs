//! Caller identity extraction
//!
//! Identity arrives in the `X-User-Id` header, populated by the auth
//! layer in front of this service. Absence is not an error at extraction
//! time; each handler decides whether anonymous callers are acceptable
//! (uploads synthesize a guest identity, preferences require one).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lux_common::api::USER_ID_HEADER;
use std::convert::Infallible;

/// Caller identity, if the request carried one
#[derive(Debug, Clone)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from);
        Ok(Identity(id))
    }
}
