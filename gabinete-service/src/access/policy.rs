//! The authoritative role → capability table.
//!
//! Every permission check in the service reads from one [`PolicyTable`],
//! injected through the application state. There is no second copy of the
//! mapping anywhere else.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Capability, Role};

#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    grants: HashMap<Capability, BTreeSet<Role>>,
    /// Which target roles an actor may create, edit or delete users with.
    managed: HashMap<Role, BTreeSet<Role>>,
}

impl PolicyTable {
    /// An empty table: every check is denied.
    pub fn new() -> Self {
        Self::default()
    }

    /// The office policy.
    pub fn standard() -> Self {
        use Capability::*;
        use Role::*;

        Self::new()
            .grant(Create, &[Admin, ChefeGabinete, Assessor])
            .grant(Edit, &[Admin, ChefeGabinete, Assessor])
            .grant(Delete, &[Admin, ChefeGabinete])
            .grant(Export, &[Admin, ChefeGabinete])
            .grant(ViewReports, &[Admin, ChefeGabinete, Assessor])
            .grant(ViewAuditLogs, &[Admin, ChefeGabinete])
            .grant(ManageUsers, &[Admin, ChefeGabinete])
            .grant(AccessMaintenance, &[Admin])
            .grant(ManageBackup, &[Admin])
            .allow_management(Admin, &Role::ALL)
            .allow_management(ChefeGabinete, &[Visualizador, Assessor])
    }

    /// Add `roles` to the set permitted to exercise `capability`.
    pub fn grant(mut self, capability: Capability, roles: &[Role]) -> Self {
        self.grants
            .entry(capability)
            .or_default()
            .extend(roles.iter().copied());
        self
    }

    /// Let `actor` manage users whose role is one of `targets`.
    pub fn allow_management(mut self, actor: Role, targets: &[Role]) -> Self {
        self.managed
            .entry(actor)
            .or_default()
            .extend(targets.iter().copied());
        self
    }

    pub fn allows(&self, role: Role, capability: Capability) -> bool {
        self.grants
            .get(&capability)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Roles permitted to exercise `capability`, in declaration order of [`Role`].
    pub fn roles_for(&self, capability: Capability) -> Vec<Role> {
        self.grants
            .get(&capability)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn can_manage(&self, actor: Role, target: Role) -> bool {
        self.managed
            .get(&actor)
            .is_some_and(|targets| targets.contains(&target))
    }

    pub fn manageable_roles(&self, actor: Role) -> Vec<Role> {
        self.managed
            .get(&actor)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }
}
