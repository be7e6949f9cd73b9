//! Capability model - named actions derived from a role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission check. Never stored; always recomputed from the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "canCreate")]
    Create,
    #[serde(rename = "canEdit")]
    Edit,
    #[serde(rename = "canDelete")]
    Delete,
    #[serde(rename = "canExport")]
    Export,
    #[serde(rename = "canViewReports")]
    ViewReports,
    #[serde(rename = "canViewAuditLogs")]
    ViewAuditLogs,
    #[serde(rename = "canManageUsers")]
    ManageUsers,
    #[serde(rename = "canAccessMaintenance")]
    AccessMaintenance,
    #[serde(rename = "canManageBackup")]
    ManageBackup,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::Create,
        Capability::Edit,
        Capability::Delete,
        Capability::Export,
        Capability::ViewReports,
        Capability::ViewAuditLogs,
        Capability::ManageUsers,
        Capability::AccessMaintenance,
        Capability::ManageBackup,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Capability::Create => "canCreate",
            Capability::Edit => "canEdit",
            Capability::Delete => "canDelete",
            Capability::Export => "canExport",
            Capability::ViewReports => "canViewReports",
            Capability::ViewAuditLogs => "canViewAuditLogs",
            Capability::ManageUsers => "canManageUsers",
            Capability::AccessMaintenance => "canAccessMaintenance",
            Capability::ManageBackup => "canManageBackup",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
