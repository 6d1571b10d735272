//! In-process publish/subscribe fan-out.
//!
//! Mutations publish events here; live subscription streams (SSE) and any
//! other interested subsystem receive them over a broadcast channel. Lagging
//! subscribers lose the oldest events rather than blocking publishers.

use tokio::sync::broadcast;

use crate::models::Notification;

#[derive(Debug, Clone)]
pub enum Event {
    NotificationAdded(Notification),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all current subscribers. Having no subscribers is normal.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
