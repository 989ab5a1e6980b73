//! HTTP API handlers for lux-server

pub mod chat;
pub mod events;
pub mod health;
pub mod identity;
pub mod preferences;
pub mod upload;

pub use chat::{get_status, get_transcript, send_message};
pub use events::event_stream;
pub use health::health_routes;
pub use identity::Identity;
pub use preferences::{get_preferences, save_preferences};
pub use upload::upload;
