//! Persisted key-value storage with a change notification.
//!
//! A write made through one instance is visible to every instance sharing
//! the backend, and every *other* instance is told about it. Instances are
//! told apart by the `origin` id carried on each [`StorageEvent`].

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_BUFFER: usize = 64;

/// Change notification for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: String,
    pub value: Option<String>,
    /// Instance that performed the write.
    pub origin: Uuid,
}

/// What a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNotice {
    Changed(StorageEvent),
    /// The notification stream was re-established. Changes made while it
    /// was down were not delivered, so persisted values must be re-read.
    Resubscribed,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    /// Persist `value` under `key` and notify the other instances.
    async fn set(&self, key: &str, value: &str, origin: Uuid) -> Result<(), anyhow::Error>;

    /// Stream of change notifications, including the caller's own writes.
    fn subscribe(&self) -> broadcast::Receiver<StorageNotice>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

/// In-process backend. Several stores built over one `MemoryStore` behave
/// like several tabs of one origin.
#[derive(Clone)]
pub struct MemoryStore {
    values: Arc<DashMap<String, String>>,
    events: broadcast::Sender<StorageNotice>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            values: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Write without notifying anyone, as an out-of-band edit would.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Deliver a notification as if another instance had written.
    pub fn notify(&self, event: StorageEvent) {
        let _ = self.events.send(StorageNotice::Changed(event));
    }

    /// Report a re-established notification stream, as a backend does after
    /// reconnecting.
    pub fn resubscribed(&self) {
        let _ = self.events.send(StorageNotice::Resubscribed);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str, origin: Uuid) -> Result<(), anyhow::Error> {
        self.values.insert(key.to_string(), value.to_string());
        // No subscribers is not an error.
        let _ = self.events.send(StorageNotice::Changed(StorageEvent {
            key: key.to_string(),
            value: Some(value.to_string()),
            origin,
        }));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageNotice> {
        self.events.subscribe()
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
