//! Redis backend: `SET` persists, `PUBLISH` on [`STORAGE_CHANNEL`] notifies
//! every instance subscribed to the same server. Each (re)subscription is
//! announced as [`StorageNotice::Resubscribed`] so listeners re-read what
//! they may have missed.

use async_trait::async_trait;
use futures::StreamExt;
use redis::{aio::ConnectionManager, Client};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::storage::{KeyValueStore, StorageEvent, StorageNotice};

pub const STORAGE_CHANNEL: &str = "gabinete:storage";

const EVENT_BUFFER: usize = 64;
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    events: broadcast::Sender<StorageNotice>,
}

impl RedisStore {
    /// Connect and start forwarding channel messages until `cancel` fires.
    pub async fn connect(url: &str, cancel: CancellationToken) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %url, "Connecting to Redis");
        let client = Client::open(url)?;

        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        tokio::spawn(forward_notifications(client, events.clone(), cancel));

        tracing::info!("Successfully connected to Redis");
        Ok(Self { manager, events })
    }
}

async fn forward_notifications(
    client: Client,
    events: broadcast::Sender<StorageNotice>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = listen(&client, &events) => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Redis subscription lost, resubscribing");
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(RESUBSCRIBE_DELAY) => {}
        }
    }
    tracing::debug!("Redis notification listener stopped");
}

async fn listen(
    client: &Client,
    events: &broadcast::Sender<StorageNotice>,
) -> Result<(), anyhow::Error> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(STORAGE_CHANNEL).await?;
    tracing::debug!(channel = STORAGE_CHANNEL, "Subscribed to storage notifications");
    // Anything published before this point was missed.
    let _ = events.send(StorageNotice::Resubscribed);

    let mut messages = Box::pin(pubsub.on_message());
    while let Some(msg) = messages.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable storage notification");
                continue;
            }
        };
        match serde_json::from_str::<StorageEvent>(&payload) {
            Ok(event) => {
                let _ = events.send(StorageNotice::Changed(event));
            }
            Err(e) => tracing::warn!(error = %e, "Malformed storage notification"),
        }
    }

    Err(anyhow::anyhow!("notification stream ended"))
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", key, e))
    }

    async fn set(&self, key: &str, value: &str, origin: Uuid) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", key, e))?;

        let event = StorageEvent {
            key: key.to_string(),
            value: Some(value.to_string()),
            origin,
        };
        redis::cmd("PUBLISH")
            .arg(STORAGE_CHANNEL)
            .arg(serde_json::to_string(&event)?)
            .query_async::<_, i64>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to publish change of {}: {}", key, e))?;

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageNotice> {
        self.events.subscribe()
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}
