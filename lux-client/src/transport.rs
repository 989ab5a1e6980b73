//! Transport seam between the chat view and the session service
//!
//! The poller and the voice/send path talk to the service through this
//! trait, so the state machines can be exercised against an in-memory
//! double. The reqwest implementation attaches the caller identity to
//! every request and carries a fixed timeout, bounding how long the
//! `processing` phase can dangle on a dead network.

use async_trait::async_trait;
use lux_common::api::{
    ErrorResponse, SendMessageRequest, UploadResponse, USER_ID_HEADER,
};
use lux_common::chat::{StatusEntry, TranscriptEntry};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Operations the chat view needs from the session service
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch the owner's transcript document
    async fn fetch_transcript(&self, owner_id: &str)
        -> Result<Vec<TranscriptEntry>, TransportError>;

    /// Fetch the owner's status log document
    async fn fetch_status(&self, owner_id: &str) -> Result<Vec<StatusEntry>, TransportError>;

    /// Deliver one message; the reply arrives via the transcript later
    async fn send_message(&self, request: &SendMessageRequest) -> Result<(), TransportError>;

    /// Upload a file through the Upload Handler contract
    ///
    /// Used for the initial photo and for finalized voice recordings
    /// (which carry their live `transcript` text alongside).
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        transcript: Option<&str>,
    ) -> Result<UploadResponse, TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for std::sync::Arc<T> {
    async fn fetch_transcript(
        &self,
        owner_id: &str,
    ) -> Result<Vec<TranscriptEntry>, TransportError> {
        (**self).fetch_transcript(owner_id).await
    }

    async fn fetch_status(&self, owner_id: &str) -> Result<Vec<StatusEntry>, TransportError> {
        (**self).fetch_status(owner_id).await
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<(), TransportError> {
        (**self).send_message(request).await
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        transcript: Option<&str>,
    ) -> Result<UploadResponse, TransportError> {
        (**self).upload(file_name, bytes, transcript).await
    }
}

/// HTTP transport against a running lux-server
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport that authenticates as `identity`
    ///
    /// For guest flows the identity is the `guest-<uuid>` issued by the
    /// first upload; anonymous transports (identity unknown until that
    /// upload returns) pass `None`.
    pub fn new(base_url: impl Into<String>, identity: Option<&str>) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(id) = identity {
            let value = HeaderValue::from_str(id)
                .map_err(|e| TransportError::Parse(format!("Invalid identity: {}", e)))?;
            headers.insert(USER_ID_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(TransportError::Api(status.as_u16(), message));
        }
        response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn fetch_transcript(
        &self,
        owner_id: &str,
    ) -> Result<Vec<TranscriptEntry>, TransportError> {
        self.get_json(&format!("/api/chat/{}/transcript", owner_id))
            .await
    }

    async fn fetch_status(&self, owner_id: &str) -> Result<Vec<StatusEntry>, TransportError> {
        self.get_json(&format!("/api/chat/{}/status", owner_id)).await
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<(), TransportError> {
        let url = format!("{}/api/chat/message", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(TransportError::Api(status.as_u16(), message));
        }
        Ok(())
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        transcript: Option<&str>,
    ) -> Result<UploadResponse, TransportError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(text) = transcript {
            form = form.text("transcript", text.to_string());
        }

        let url = format!("{}/api/upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::decode(response).await
    }
}
