//! Viewer broadcast rooms
//!
//! One broadcast group per deployment slug. Delivery is at-most-once with
//! no replay: events published while no viewer is joined are dropped, and
//! a viewer only ever sees events published after it joined. Each room is
//! a bounded ring; a viewer that falls too far behind loses the oldest
//! events instead of exerting backpressure on the relay.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use crate::models::deployment::ViewerEvent;

/// Per-deployment broadcast groups for live log viewers
pub struct LogRooms {
    capacity: usize,
    rooms: RwLock<HashMap<String, broadcast::Sender<ViewerEvent>>>,
}

impl LogRooms {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Join a deployment's room, creating it on first use.
    ///
    /// Joining is idempotent at the room level: every call returns a fresh
    /// receiver attached to the same group, observing only events published
    /// from this point on.
    pub async fn join(&self, slug: &str) -> broadcast::Receiver<ViewerEvent> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(slug.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish an event into a room. Dropped silently when the room does
    /// not exist or no viewer is attached; empty rooms are pruned.
    pub async fn publish(&self, slug: &str, event: ViewerEvent) {
        let mut rooms = self.rooms.write().await;
        if let Some(sender) = rooms.get(slug) {
            if sender.send(event).is_err() {
                rooms.remove(slug);
            }
        }
    }
}

impl Default for LogRooms {
    fn default() -> Self {
        Self::new(256)
    }
}
