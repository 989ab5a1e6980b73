//! Chat transcript and status log document shapes
//!
//! The transcript document (`chat_history.json`) is an ordered array of
//! single-key objects, `{"user": text}` or `{"model": text}`. The status
//! document (`responses.json`) is an ordered array whose entries are
//! either a bare string or an array of strings (a set of links). Both are
//! written by the message backend and only ever read by the client flow.

use serde::{Deserialize, Serialize};

/// One turn in the on-disk transcript document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptEntry {
    /// A user turn: `{"user": "..."}`
    User {
        user: String,
    },
    /// A model turn: `{"model": "..."}`
    Model {
        model: String,
    },
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        TranscriptEntry::User { user: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        TranscriptEntry::Model { model: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            TranscriptEntry::User { user } => user,
            TranscriptEntry::Model { model } => model,
        }
    }
}

/// Message author as rendered in the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One rendered chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Storage-relative path of an attached audio recording, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
            audio_path: None,
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::Ai,
            content: content.into(),
            audio_path: None,
        }
    }
}

impl From<&TranscriptEntry> for ChatMessage {
    fn from(entry: &TranscriptEntry) -> Self {
        match entry {
            TranscriptEntry::User { user } => ChatMessage::user(user.clone()),
            TranscriptEntry::Model { model } => ChatMessage::ai(model.clone()),
        }
    }
}

/// One entry in the status log document
///
/// Free-form by design: the backend appends either a human-readable
/// progress string or an array interpreted as a set of source links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusEntry {
    Text(String),
    Links(Vec<String>),
}

impl StatusEntry {
    pub fn text(s: impl Into<String>) -> Self {
        StatusEntry::Text(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_entry_round_trips_original_shape() {
        let doc = r#"[{"user":"rate my outfit"},{"model":"Looks sharp."}]"#;
        let entries: Vec<TranscriptEntry> = serde_json::from_str(doc).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], TranscriptEntry::user("rate my outfit"));
        assert_eq!(entries[1], TranscriptEntry::model("Looks sharp."));

        let out = serde_json::to_string(&entries).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn transcript_entry_maps_to_chat_roles() {
        let user: ChatMessage = (&TranscriptEntry::user("hi")).into();
        assert_eq!(user.role, ChatRole::User);
        let ai: ChatMessage = (&TranscriptEntry::model("hello")).into();
        assert_eq!(ai.role, ChatRole::Ai);
        assert_eq!(ai.content, "hello");
    }

    #[test]
    fn status_entry_accepts_strings_and_link_sets() {
        let doc = r#"["Analyzing your closet","Done",["https://a.example","https://b.example"]]"#;
        let entries: Vec<StatusEntry> = serde_json::from_str(doc).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], StatusEntry::text("Analyzing your closet"));
        assert!(matches!(&entries[2], StatusEntry::Links(links) if links.len() == 2));
    }
}
