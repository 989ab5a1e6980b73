//! Per-owner SSE broadcasting
//!
//! Push-based alternative to polling the transcript/status documents.
//! Each owner gets a lazily-created broadcast channel; handlers that
//! mutate an owner's documents publish events into it, and any number of
//! connected clients for that owner receive them.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use lux_common::events::SessionEvent;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Events buffered per owner channel
const CHANNEL_CAPACITY: usize = 64;

/// Manages one broadcast channel per owner and fans events out to
/// connected SSE clients
#[derive(Clone, Default)]
pub struct EventBroadcaster {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<SessionEvent>>>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcast an event to the owner's channel, ignoring the case of no
    /// connected clients
    ///
    /// Channels are only created by subscription, and a channel whose
    /// last receiver is gone is dropped here, so the per-owner map does
    /// not accumulate entries for every guest the server has ever seen.
    pub fn broadcast_lossy(&self, event: SessionEvent) {
        let mut channels = self.channels.lock().expect("broadcaster lock poisoned");
        let Some(sender) = channels.get(event.owner_id()) else {
            return; // Nobody ever subscribed to this owner
        };
        match sender.send(event) {
            Ok(count) => debug!("Broadcast event to {} clients", count),
            Err(broadcast::error::SendError(event)) => {
                channels.remove(event.owner_id());
            }
        }
    }

    /// Subscribe to one owner's event stream
    pub fn subscribe(&self, owner_id: &str) -> broadcast::Receiver<SessionEvent> {
        self.sender_for(owner_id).subscribe()
    }

    #[cfg(test)]
    fn channel_count(&self) -> usize {
        self.channels.lock().expect("broadcaster lock poisoned").len()
    }

    /// Create an Axum SSE response for one owner's connection
    pub fn handle_sse_connection(
        &self,
        owner_id: &str,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        info!(owner = %owner_id, "New SSE client connected");

        let rx = self.subscribe(owner_id);
        let stream = BroadcastStream::new(rx).filter_map(|result| async move {
            match result {
                Ok(session_event) => Event::default()
                    .event(session_event.event_name())
                    .json_data(&session_event)
                    .ok()
                    .map(Ok),
                Err(e) => {
                    // Lagged receiver; drop the gap and continue
                    warn!("SSE client error: {:?}", e);
                    None
                }
            }
        });

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("heartbeat"),
        )
    }

    fn sender_for(&self, owner_id: &str) -> broadcast::Sender<SessionEvent> {
        let mut channels = self.channels.lock().expect("broadcaster lock poisoned");
        channels
            .entry(owner_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_owner_events() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe("u1");

        broadcaster.broadcast_lossy(SessionEvent::TranscriptUpdated {
            owner_id: "u1".into(),
            turns: 2,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_name(), "TranscriptUpdated");
    }

    #[tokio::test]
    async fn dead_channels_are_evicted() {
        let broadcaster = EventBroadcaster::new();

        // Broadcasting to an owner nobody subscribed to creates nothing
        broadcaster.broadcast_lossy(SessionEvent::TranscriptUpdated {
            owner_id: "u1".into(),
            turns: 1,
        });
        assert_eq!(broadcaster.channel_count(), 0);

        // A disconnected subscriber's channel is dropped on the next
        // broadcast, so the map does not grow with past owners
        let rx = broadcaster.subscribe("u1");
        assert_eq!(broadcaster.channel_count(), 1);
        drop(rx);
        broadcaster.broadcast_lossy(SessionEvent::TranscriptUpdated {
            owner_id: "u1".into(),
            turns: 2,
        });
        assert_eq!(broadcaster.channel_count(), 0);
    }

    #[tokio::test]
    async fn events_are_scoped_per_owner() {
        let broadcaster = EventBroadcaster::new();
        let mut u2_rx = broadcaster.subscribe("u2");

        broadcaster.broadcast_lossy(SessionEvent::TranscriptUpdated {
            owner_id: "u1".into(),
            turns: 1,
        });

        assert!(matches!(
            u2_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
