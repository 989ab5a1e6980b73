//! Session events pushed to connected clients
//!
//! Broadcast over the per-owner SSE stream as an alternative to polling
//! the transcript/status documents. Event payloads carry enough for a
//! client to decide whether to re-fetch; they are not a substitute for
//! the documents themselves.

use crate::chat::StatusEntry;
use serde::{Deserialize, Serialize};

/// Events scoped to one owner's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The transcript document changed (turn appended or rewritten)
    TranscriptUpdated {
        owner_id: String,
        /// Number of turns now in the document
        turns: usize,
    },
    /// A status entry was appended to the status log
    StatusAppended {
        owner_id: String,
        entry: StatusEntry,
    },
}

impl SessionEvent {
    /// SSE event name for this event
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::TranscriptUpdated { .. } => "TranscriptUpdated",
            SessionEvent::StatusAppended { .. } => "StatusAppended",
        }
    }

    /// Owner this event is scoped to
    pub fn owner_id(&self) -> &str {
        match self {
            SessionEvent::TranscriptUpdated { owner_id, .. } => owner_id,
            SessionEvent::StatusAppended { owner_id, .. } => owner_id,
        }
    }
}
