//! Message handling backends
//!
//! Two modes, matching the two variants of the product: a standalone
//! canned responder that picks a reply from a fixed list, and a relay
//! that forwards the message to an external styling backend which writes
//! the transcript/status documents itself. Neither mode returns the AI
//! reply inline; clients observe it through the polled or streamed
//! transcript.

use lux_common::{Error, Result};
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{debug, info};

/// Replies used when no external backend is configured
const CANNED_REPLIES: [&str; 5] = [
    "Your outfit has a smart casual style. I particularly like how the colors work together!",
    "Based on current trends, I'd suggest pairing this with a minimalist accessory like a silver bracelet or watch.",
    "This outfit would work well for a variety of occasions including work meetings, lunch with friends, or casual evening events.",
    "The fit of your clothing appears good. The proportions are balanced nicely between top and bottom.",
    "For similar styles, you might like to try incorporating more layered pieces like light jackets or cardigans.",
];

/// Staged delay before the canned reply lands in the transcript
const CANNED_REPLY_DELAY: Duration = Duration::from_millis(1500);

/// How a send is handled: locally canned or relayed to the backend
pub enum MessageBackend {
    Canned(CannedResponder),
    Relay(MessageRelay),
}

/// Standalone reply source: a random pick from the canned list
#[derive(Debug, Clone)]
pub struct CannedResponder {
    delay: Duration,
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self {
            delay: CANNED_REPLY_DELAY,
        }
    }
}

impl CannedResponder {
    /// Responder whose reply lands after `delay` (tests use zero)
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn reply(&self) -> &'static str {
        CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .expect("canned reply list is non-empty")
    }
}

/// Forwards messages to the external styling backend
pub struct MessageRelay {
    http: reqwest::Client,
    url: String,
}

impl MessageRelay {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build relay client: {}", e)))?;
        info!(url = %url, "Message relay configured");
        Ok(Self { http, url })
    }

    /// Forward one message; no retry, a failure is terminal for the send
    pub async fn forward(&self, user_id: &str, text: &str) -> Result<()> {
        debug!(owner = %user_id, "Relaying message to backend");

        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "text": text, "userid": user_id }))
            .send()
            .await
            .map_err(|e| Error::Internal(format!("Message backend unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Message backend returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
