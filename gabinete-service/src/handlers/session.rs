//! Login entry point, dashboard and the caller's own profile.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use gabinete_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::access::{PermissionSummary, Permissions, DASHBOARD_PATH};
use crate::middleware::AuthUser;
use crate::models::CurrentUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    /// Where to go once signed in.
    pub redirect: String,
}

/// Only same-site absolute paths are followed after login.
fn safe_redirect(target: Option<&str>) -> String {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => {
            t.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}

pub async fn login(permissions: Permissions, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    Json(LoginResponse {
        authenticated: permissions.user().is_some(),
        redirect: safe_redirect(query.redirect.as_deref()),
    })
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CurrentUser,
    pub role_label: &'static str,
    pub permissions: PermissionSummary,
    /// Locked out by maintenance mode.
    pub blocked: bool,
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    permissions: Permissions,
) -> Result<impl IntoResponse, AppError> {
    let blocked = state.maintenance.is_system_blocked(Some(user.role));
    Ok(Json(MeResponse {
        role_label: user.role.label(),
        permissions: permissions.summary(),
        blocked,
        user,
    }))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: CurrentUser,
    pub total_people: usize,
    pub total_interactions: usize,
    pub maintenance_enabled: bool,
}

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let report = state.registry.summary(chrono::Utc::now());
    Ok(Json(DashboardResponse {
        user,
        total_people: report.total_people,
        total_interactions: report.total_interactions,
        maintenance_enabled: state.maintenance.is_enabled(),
    }))
}
