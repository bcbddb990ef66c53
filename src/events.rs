//! Named events emitted by devices and the driver
//!
//! Devices emit `data` events carrying their latest status output; the driver
//! emits `register` when a device joins the host and `poll` at every poll pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const DATA_EVENT: &str = "data";
pub const REGISTER_EVENT: &str = "register";
pub const POLL_EVENT: &str = "poll";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    /// Identifier of the emitter
    pub source: String,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(name: &str, source: &str, payload: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Anything that publishes named events to subscribers
pub trait EventEmitter {
    fn emit(&self, event: Event);

    fn subscribe(&self, name: &str, handler: EventHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Handler table shared by every emitter in the crate
#[derive(Default)]
pub struct EventHub {
    handlers: Mutex<HashMap<String, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        match self.handlers.lock() {
            Ok(handlers) => handlers.get(name).map_or(0, Vec::len),
            Err(_) => 0,
        }
    }
}

impl EventEmitter for EventHub {
    fn emit(&self, event: Event) {
        // Handlers run outside the lock so they may subscribe or emit themselves
        let handlers: Vec<EventHandler> = match self.handlers.lock() {
            Ok(handlers) => handlers
                .get(&event.name)
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default(),
            Err(_) => {
                log::warn!("Event handler table poisoned, dropping '{}' event", event.name);
                return;
            }
        };

        for handler in handlers {
            handler(&event);
        }
    }

    fn subscribe(&self, name: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.handlers.lock() {
            Ok(mut handlers) => handlers
                .entry(name.to_string())
                .or_default()
                .push((id, handler)),
            Err(_) => log::warn!("Event handler table poisoned, subscription to '{}' lost", name),
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut handlers) = self.handlers.lock() else {
            return false;
        };
        let mut removed = false;
        for list in handlers.values_mut() {
            let before = list.len();
            list.retain(|(sub, _)| *sub != id);
            removed |= list.len() != before;
        }
        removed
    }
}
