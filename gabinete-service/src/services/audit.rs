//! Bounded in-memory trail of privileged actions.

use std::collections::VecDeque;
use std::sync::RwLock;

use crate::models::{AuditEntry, CurrentUser};

pub const DEFAULT_CAPACITY: usize = 1000;

pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, dropping the oldest one when full.
    pub fn record(&self, entry: AuditEntry) {
        tracing::info!(
            actor_id = %entry.actor_id,
            actor_role = %entry.actor_role,
            action = %entry.action,
            target = %entry.target,
            "Audit"
        );

        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Shorthand for recording an action by `actor`.
    pub fn action(&self, actor: &CurrentUser, action: &str, target: impl Into<String>) {
        self.record(AuditEntry::new(actor.id, actor.role, action, target.into()));
    }

    /// Most recent first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn actor() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: "admin@camara.gov.br".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_recent_is_newest_first() {
        let log = AuditLog::default();
        let admin = actor();
        log.action(&admin, "user.create", "a");
        log.action(&admin, "user.delete", "b");

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "user.delete");
        assert_eq!(recent[1].target, "a");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = AuditLog::with_capacity(2);
        let admin = actor();
        for target in ["a", "b", "c"] {
            log.action(&admin, "person.delete", target);
        }

        assert_eq!(log.len(), 2);
        let targets: Vec<String> = log.recent(5).into_iter().map(|e| e.target).collect();
        assert_eq!(targets, vec!["c", "b"]);
    }
}
