//! lux-client - client-side flow for the Lux styling chat
//!
//! Implements the upload → session → chat loop the web view drives: an
//! HTTP transport (with an in-memory seam for tests), the polling chat
//! state machine with bounded active-window scheduling and optimistic
//! send/rollback, voice capture with live transcript mirroring, and the
//! chat view that wires them together.

pub mod poller;
pub mod transport;
pub mod view;
pub mod voice;

pub use poller::{ChatPoller, SystemPhase, ACTIVE_WINDOW, POLL_PERIOD};
pub use transport::{ChatTransport, HttpTransport, TransportError};
pub use view::{ChatView, ViewError};
pub use voice::{CaptureError, CaptureState, Recorder, Recording, VoiceCapture};
