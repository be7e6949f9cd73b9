//! Administrative operations.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use gabinete_core::error::AppError;
use serde::Serialize;

use crate::access::Permissions;
use crate::middleware::AuthUser;
use crate::models::{AuditEntry, Capability, Interaction, Person, User};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Backup {
    pub generated_at: DateTime<Utc>,
    pub service_version: String,
    pub maintenance_enabled: bool,
    pub users: Vec<User>,
    pub people: Vec<Person>,
    pub interactions: Vec<Interaction>,
}

/// Full JSON snapshot of every record held by this instance.
pub async fn backup(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ManageBackup)?;

    let snapshot = state.registry.snapshot();
    let backup = Backup {
        generated_at: Utc::now(),
        service_version: state.config.service_version.clone(),
        maintenance_enabled: state.maintenance.is_enabled(),
        users: state.users.list(),
        people: snapshot.people,
        interactions: snapshot.interactions,
    };

    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "backup.download", "backup".to_string())
            .with_details(format!(
                "users={} people={} interactions={}",
                backup.users.len(),
                backup.people.len(),
                backup.interactions.len()
            )),
    );

    let filename = format!(
        "attachment; filename=\"gabinete-backup-{}.json\"",
        backup.generated_at.format("%Y%m%d%H%M%S")
    );
    Ok(([(header::CONTENT_DISPOSITION, filename)], Json(backup)))
}
