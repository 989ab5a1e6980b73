//! File-backed session store
//!
//! One directory per owner under the data root, holding the uploaded
//! image(s), the preferences document, and the transcript/status
//! documents. Flat JSON and binary files, no database; the only
//! concurrency discipline is last-write-wins, which matches the
//! single-writer-per-owner usage.
//!
//! Layout:
//! ```text
//! <data_root>/
//!   <owner_id>/
//!     <session_id>.<ext>     uploaded image or recording
//!     preferences.json       onboarding-derived preferences
//!     chat_history.json      transcript document
//!     responses.json         status log document
//! ```

pub mod gc;

use lux_common::api::{GUEST_PREFIX, STATUS_FILE, TRANSCRIPT_FILE};
use lux_common::chat::{StatusEntry, TranscriptEntry};
use lux_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// File name of the per-owner preferences document
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Fallback extension when the original file name has none
const DEFAULT_EXTENSION: &str = "bin";

/// What the Upload Handler hands back after persisting a file
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Resolved owner identity (caller's id, or a fresh `guest-<uuid>`)
    pub owner_id: String,
    /// Session identifier; also the stem of the stored file name
    pub session_id: Uuid,
    /// Storage-relative path of the stored file
    pub file_path: String,
}

/// Per-owner file-backed storage rooted at one directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    data_root: PathBuf,
}

impl SessionStore {
    /// Open a store at `data_root`, creating the directory if absent
    pub fn open(data_root: impl Into<PathBuf>) -> Result<Self> {
        let data_root = data_root.into();
        std::fs::create_dir_all(&data_root)?;
        Ok(Self { data_root })
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Persist one uploaded file and initialize the session documents
    ///
    /// With an identity present the file lands in that owner's directory;
    /// without one a guest identity is synthesized. The stored name is a
    /// fresh UUID plus the original extension, so repeated uploads of the
    /// same source file never collide. Placeholder transcript/status
    /// documents are created empty if they do not already exist.
    ///
    /// A write failure after the file write but before the placeholder
    /// writes leaves a partial session behind; there is no cleanup here,
    /// the guest sweeper eventually reclaims abandoned guest directories.
    pub fn create_session(
        &self,
        identity: Option<&str>,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadReceipt> {
        let owner_id = match identity {
            Some(id) => {
                validate_owner_id(id)?;
                id.to_string()
            }
            None => format!("{}{}", GUEST_PREFIX, Uuid::new_v4()),
        };

        let dir = self.ensure_owner_dir(&owner_id)?;

        let session_id = Uuid::new_v4();
        let extension = file_extension(original_name);
        let file_name = format!("{}.{}", session_id, extension);
        std::fs::write(dir.join(&file_name), bytes)?;

        for doc in [TRANSCRIPT_FILE, STATUS_FILE] {
            let path = dir.join(doc);
            if !path.exists() {
                write_json_atomic(&path, &Vec::<Value>::new())?;
            }
        }

        let file_path = format!("{}/{}", owner_id, file_name);
        info!(owner = %owner_id, session = %session_id, path = %file_path, "Stored upload");

        Ok(UploadReceipt {
            owner_id,
            session_id,
            file_path,
        })
    }

    /// Store the live transcript text captured alongside a recording
    ///
    /// Written next to the session's audio file as `<session_id>.txt`.
    pub fn attach_transcript_text(
        &self,
        owner_id: &str,
        session_id: Uuid,
        text: &str,
    ) -> Result<()> {
        let dir = self.ensure_owner_dir(owner_id)?;
        std::fs::write(dir.join(format!("{}.txt", session_id)), text)?;
        Ok(())
    }

    /// Read the stored preferences document verbatim
    pub fn load_preferences(&self, owner_id: &str) -> Result<Value> {
        validate_owner_id(owner_id)?;
        let path = self.data_root.join(owner_id).join(PREFERENCES_FILE);
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "No preferences stored for {}",
                owner_id
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the preferences document wholesale
    ///
    /// Stamps the resolved owner id and the write time; everything else
    /// in the document is persisted as given, schema unchecked.
    pub fn save_preferences(&self, owner_id: &str, mut document: Value) -> Result<()> {
        let dir = self.ensure_owner_dir(owner_id)?;

        if let Some(object) = document.as_object_mut() {
            object.insert("user_id".to_string(), Value::String(owner_id.to_string()));
            object.insert(
                "updated_at".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        } else {
            return Err(Error::InvalidInput(
                "Preferences document must be a JSON object".to_string(),
            ));
        }

        write_json_atomic(&dir.join(PREFERENCES_FILE), &document)?;
        debug!(owner = %owner_id, "Saved preferences");
        Ok(())
    }

    /// Read the transcript document; an absent document is an empty one
    pub fn read_transcript(&self, owner_id: &str) -> Result<Vec<TranscriptEntry>> {
        validate_owner_id(owner_id)?;
        self.read_doc(owner_id, TRANSCRIPT_FILE)
    }

    /// Append turns to the transcript document, returning its new length
    pub fn append_transcript(
        &self,
        owner_id: &str,
        turns: impl IntoIterator<Item = TranscriptEntry>,
    ) -> Result<usize> {
        let dir = self.ensure_owner_dir(owner_id)?;
        let mut entries: Vec<TranscriptEntry> = self.read_doc(owner_id, TRANSCRIPT_FILE)?;
        entries.extend(turns);
        write_json_atomic(&dir.join(TRANSCRIPT_FILE), &entries)?;
        Ok(entries.len())
    }

    /// Read the status log document; an absent document is an empty one
    pub fn read_status(&self, owner_id: &str) -> Result<Vec<StatusEntry>> {
        validate_owner_id(owner_id)?;
        self.read_doc(owner_id, STATUS_FILE)
    }

    /// Append one entry to the status log document
    pub fn append_status(&self, owner_id: &str, entry: StatusEntry) -> Result<()> {
        let dir = self.ensure_owner_dir(owner_id)?;
        let mut entries: Vec<StatusEntry> = self.read_doc(owner_id, STATUS_FILE)?;
        entries.push(entry);
        write_json_atomic(&dir.join(STATUS_FILE), &entries)?;
        Ok(())
    }

    /// Delete guest directories whose newest content is older than `ttl`
    ///
    /// Authenticated owners are never touched. Returns how many
    /// directories were removed.
    pub fn sweep_guest_sessions(&self, ttl: std::time::Duration) -> Result<usize> {
        let now = std::time::SystemTime::now();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.data_root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(GUEST_PREFIX) || !entry.path().is_dir() {
                continue;
            }

            let Some(newest) = newest_mtime(&entry.path())? else {
                continue;
            };
            let expired = now
                .duration_since(newest)
                .map(|age| age >= ttl)
                .unwrap_or(false);
            if expired {
                std::fs::remove_dir_all(entry.path())?;
                info!(owner = %name, "Swept expired guest session");
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn ensure_owner_dir(&self, owner_id: &str) -> Result<PathBuf> {
        validate_owner_id(owner_id)?;
        let dir = self.data_root.join(owner_id);
        // Idempotent: create-if-absent
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn read_doc<T: DeserializeOwned>(&self, owner_id: &str, file: &str) -> Result<Vec<T>> {
        let path = self.data_root.join(owner_id).join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Reject identities that could escape the data root
fn validate_owner_id(owner_id: &str) -> Result<()> {
    let valid = !owner_id.is_empty()
        && owner_id.len() < 128
        && owner_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Invalid owner id: {:?}",
            owner_id
        )))
    }
}

/// Extension of the original file name, lowercased
fn file_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Newest modification time among the directory's direct children,
/// falling back to the directory's own mtime when it is empty
fn newest_mtime(dir: &Path) -> Result<Option<std::time::SystemTime>> {
    let mut newest = std::fs::metadata(dir)?.modified().ok();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Ok(modified) = entry.metadata()?.modified() {
            newest = Some(match newest {
                Some(current) if current >= modified => current,
                _ => modified,
            });
        }
    }
    Ok(newest)
}

/// Write a JSON document via a temp file and rename, so readers never
/// observe a half-written document
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension(format!("tmp.{}", Uuid::new_v4()));
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_validation() {
        assert!(validate_owner_id("user_2v1sELLPUpnBpR8pviRBtRvMFqE").is_ok());
        assert!(validate_owner_id("guest-5f1c1b2a-0000-4000-8000-000000000000").is_ok());
        assert!(validate_owner_id("").is_err());
        assert!(validate_owner_id("../escape").is_err());
        assert!(validate_owner_id("a/b").is_err());
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("shirt.png"), "png");
        assert_eq!(file_extension("photo.JPEG"), "jpeg");
        assert_eq!(file_extension("noext"), "bin");
        assert_eq!(file_extension("trailing."), "bin");
    }
}
