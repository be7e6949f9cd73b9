use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use gabinete_core::error::AppError;
use serde::Deserialize;

use crate::access::Permissions;
use crate::models::Capability;
use crate::AppState;

const DEFAULT_AUDIT_LIMIT: usize = 100;
const MAX_AUDIT_LIMIT: usize = 1000;

pub async fn summary(
    State(state): State<AppState>,
    permissions: Permissions,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ViewReports)?;
    Ok(Json(state.registry.summary(chrono::Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

pub async fn audit_logs(
    State(state): State<AppState>,
    permissions: Permissions,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ViewAuditLogs)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .clamp(1, MAX_AUDIT_LIMIT);
    let entries = state.audit.recent(limit);

    Ok(Json(serde_json::json!({
        "total": entries.len(),
        "entries": entries,
    })))
}
