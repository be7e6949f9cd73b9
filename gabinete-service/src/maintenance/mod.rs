//! Maintenance mode: the persisted flag, its storage backends and
//! cross-instance synchronization.

pub mod redis_store;
pub mod storage;
pub mod store;

pub use redis_store::RedisStore;
pub use storage::{KeyValueStore, MemoryStore, StorageEvent, StorageNotice};
pub use store::{MaintenanceStore, MAINTENANCE_KEY};
