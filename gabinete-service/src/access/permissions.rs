//! Permission resolver: answers capability and role-target questions for the
//! current caller.
//!
//! All predicates are pure functions of the caller's role. A missing caller
//! yields `false` everywhere.

use std::collections::BTreeMap;
use std::sync::Arc;

use gabinete_core::error::AppError;
use serde::Serialize;

use super::PolicyTable;
use crate::models::{Capability, CurrentUser, Role};

#[derive(Debug, Clone)]
pub struct Permissions {
    user: Option<CurrentUser>,
    policy: Arc<PolicyTable>,
}

impl Permissions {
    pub fn new(user: Option<CurrentUser>, policy: Arc<PolicyTable>) -> Self {
        Self { user, policy }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|role| roles.contains(&role))
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.role()
            .is_some_and(|role| self.policy.allows(role, capability))
    }

    pub fn can_create(&self) -> bool {
        self.has(Capability::Create)
    }

    pub fn can_edit(&self) -> bool {
        self.has(Capability::Edit)
    }

    pub fn can_delete(&self) -> bool {
        self.has(Capability::Delete)
    }

    pub fn can_export(&self) -> bool {
        self.has(Capability::Export)
    }

    pub fn can_view_reports(&self) -> bool {
        self.has(Capability::ViewReports)
    }

    pub fn can_view_audit_logs(&self) -> bool {
        self.has(Capability::ViewAuditLogs)
    }

    pub fn can_manage_users(&self) -> bool {
        self.has(Capability::ManageUsers)
    }

    pub fn can_access_maintenance(&self) -> bool {
        self.has(Capability::AccessMaintenance)
    }

    pub fn can_manage_backup(&self) -> bool {
        self.has(Capability::ManageBackup)
    }

    fn can_manage_role(&self, target: Role) -> bool {
        self.role()
            .is_some_and(|actor| self.policy.can_manage(actor, target))
    }

    pub fn can_create_user_role(&self, target: Role) -> bool {
        self.can_manage_role(target)
    }

    pub fn can_edit_user_role(&self, target: Role) -> bool {
        self.can_manage_role(target)
    }

    pub fn can_delete_user_role(&self, target: Role) -> bool {
        self.can_manage_role(target)
    }

    /// Fail with `403` unless the caller holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.has(capability) {
            return Ok(());
        }

        tracing::warn!(
            user_id = ?self.user.as_ref().map(|u| u.id),
            role = ?self.role(),
            capability = %capability,
            "Capability denied"
        );
        Err(AppError::forbidden(format!(
            "Permissão insuficiente: {}",
            capability
        )))
    }

    /// Snapshot of every capability and manageable role for the caller.
    pub fn summary(&self) -> PermissionSummary {
        let capabilities = Capability::ALL
            .iter()
            .map(|cap| (*cap, self.has(*cap)))
            .collect();
        let manageable_roles = self
            .role()
            .map(|role| self.policy.manageable_roles(role))
            .unwrap_or_default();

        PermissionSummary {
            role: self.role(),
            capabilities,
            manageable_roles,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionSummary {
    pub role: Option<Role>,
    pub capabilities: BTreeMap<Capability, bool>,
    pub manageable_roles: Vec<Role>,
}
