//! Notifications for external watchers.
//!
//! Events are published only after the corresponding state change has been
//! applied to the store, and in the order the changes were applied.

use alloy_primitives::Address;
use paperkey_crypto::Nonce;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Protocol event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A key was bound to an account.
    Registered { account: Address, key: Address },
    /// A signed nonce was accepted and consumed.
    Verified { account: Address, nonce: Nonce },
}

/// Synchronous event listener.
///
/// Listeners run while the manager's write lock is held and must not call
/// back into the manager.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// In-memory sink that keeps every event it sees.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn on_event(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

/// Fans events out to broadcast subscribers and registered sinks.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    /// Subscribers that fall more than `capacity` events behind miss events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn publish(&self, event: Event) {
        for sink in self.sinks.read().iter() {
            sink.on_event(&event);
        }
        // No receivers is not an error.
        let _ = self.tx.send(event);
    }
}
