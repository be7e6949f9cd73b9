use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// One privileged action, recorded for users with `canViewAuditLogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub actor_id: Uuid,
    pub actor_role: Role,
    pub action: String,
    pub target: String,
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(actor_id: Uuid, actor_role: Role, action: &str, target: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            actor_id,
            actor_role,
            action: action.to_string(),
            target,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
