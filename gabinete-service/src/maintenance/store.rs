//! Maintenance-mode flag: one boolean, readable and settable from anywhere,
//! synchronized with every other instance sharing the same storage.

use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::storage::{KeyValueStore, StorageEvent, StorageNotice};
use crate::models::Role;
use crate::services::metrics;

/// Storage key holding the flag.
pub const MAINTENANCE_KEY: &str = "gabinete_maintenance_mode";

pub struct MaintenanceStore {
    instance_id: Uuid,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<bool>,
}

impl MaintenanceStore {
    /// Build the store and initialize the flag from storage.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let enabled = read_flag(storage.as_ref()).await;
        let (state, _) = watch::channel(enabled);
        metrics::set_maintenance_enabled(enabled);

        tracing::info!(maintenance_enabled = enabled, "Maintenance store loaded");

        Self {
            instance_id: Uuid::new_v4(),
            storage,
            state,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn is_enabled(&self) -> bool {
        *self.state.borrow()
    }

    /// Local change notifications; fires for writes from this instance and
    /// for synchronized writes from other instances.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Non-admin callers (anonymous ones included) are blocked while the flag
    /// is on. Admins never are, so they can always switch it off again.
    pub fn is_system_blocked(&self, role: Option<Role>) -> bool {
        self.is_enabled() && role != Some(Role::Admin)
    }

    /// Update the flag, persist it and notify the other instances.
    ///
    /// The in-memory value always changes. Returns `false` when the value
    /// could not be persisted; the failure is logged, never raised.
    pub async fn set_maintenance_mode(&self, enabled: bool) -> bool {
        self.update(enabled);

        let raw = if enabled { "true" } else { "false" };
        match self
            .storage
            .set(MAINTENANCE_KEY, raw, self.instance_id)
            .await
        {
            Ok(()) => {
                tracing::info!(maintenance_enabled = enabled, "Maintenance mode changed");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    maintenance_enabled = enabled,
                    "Failed to persist maintenance mode"
                );
                false
            }
        }
    }

    /// React to a change notification. Writes from this instance and other
    /// keys are ignored. Returns whether the event was applied.
    pub fn apply_storage_event(&self, event: &StorageEvent) -> bool {
        if event.origin == self.instance_id || event.key != MAINTENANCE_KEY {
            return false;
        }

        let enabled = parse_flag(event.value.as_deref());
        tracing::debug!(
            maintenance_enabled = enabled,
            origin = %event.origin,
            "Maintenance mode synchronized from another instance"
        );
        self.update(enabled);
        true
    }

    /// Re-read the persisted value, e.g. after missing notifications.
    pub async fn reload(&self) {
        let enabled = read_flag(self.storage.as_ref()).await;
        self.update(enabled);
    }

    /// Consume storage notifications until `cancel` fires.
    ///
    /// The flag is re-read once the subscription exists, so writes made
    /// between [`MaintenanceStore::load`] and this call are not missed.
    pub fn spawn_sync(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let mut events = self.storage.subscribe();

        tokio::spawn(async move {
            self.reload().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(StorageNotice::Changed(event)) => {
                            self.apply_storage_event(&event);
                        }
                        Ok(StorageNotice::Resubscribed) => {
                            tracing::debug!("Storage notifications resumed, reloading");
                            self.reload().await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Missed storage notifications, reloading");
                            self.reload().await;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            tracing::debug!("Maintenance sync stopped");
        })
    }

    fn update(&self, enabled: bool) {
        self.state.send_if_modified(|current| {
            if *current == enabled {
                return false;
            }
            *current = enabled;
            true
        });
        metrics::set_maintenance_enabled(enabled);
    }
}

async fn read_flag(storage: &dyn KeyValueStore) -> bool {
    match storage.get(MAINTENANCE_KEY).await {
        Ok(raw) => parse_flag(raw.as_deref()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read maintenance mode, assuming off");
            false
        }
    }
}

/// Absent or unparseable values read as `false`.
fn parse_flag(raw: Option<&str>) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    match serde_json::from_str::<bool>(raw) {
        Ok(enabled) => enabled,
        Err(e) => {
            tracing::warn!(error = %e, value = raw, "Unparseable maintenance flag, assuming off");
            false
        }
    }
}
