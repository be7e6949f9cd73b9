//! Periodic interaction status re-evaluation.

pub mod status;

pub use status::desired_status;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::{metrics, Registry};

pub struct StatusScheduler {
    registry: Arc<Registry>,
    interval: Duration,
}

impl StatusScheduler {
    pub fn new(registry: Arc<Registry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// One pass over every interaction. Returns how many changed.
    pub fn run_once(&self) -> usize {
        let changed = self.registry.refresh_statuses(Utc::now());
        for (id, status) in &changed {
            metrics::record_status_transition(status.as_str());
            tracing::debug!(interaction_id = %id, status = status.as_str(), "Interaction status advanced");
        }
        if !changed.is_empty() {
            tracing::info!(count = changed.len(), "Interaction statuses refreshed");
        }
        changed.len()
    }

    /// Run on every tick until `cancel` fires. The first pass happens
    /// immediately.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(interval_secs = self.interval.as_secs(), "Status scheduler started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                }
            }
            tracing::info!("Status scheduler stopped");
        })
    }
}
