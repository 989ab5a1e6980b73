//! Shared types and utilities for the Lux services
//!
//! Holds everything both the server and the client flow need to agree on:
//! the on-disk document shapes (transcript, status log, preferences), the
//! API request/response types, session events, the common error enum, and
//! data-root/configuration resolution.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod events;
pub mod prefs;

pub use error::{Error, Result};
