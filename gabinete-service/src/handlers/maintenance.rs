use axum::{extract::State, response::IntoResponse, Json};
use gabinete_core::error::AppError;

use crate::access::Permissions;
use crate::dtos::maintenance::{MaintenanceStatusResponse, SetMaintenanceRequest};
use crate::middleware::AuthUser;
use crate::models::Capability;
use crate::AppState;

pub async fn get_maintenance(
    State(state): State<AppState>,
    permissions: Permissions,
) -> impl IntoResponse {
    Json(MaintenanceStatusResponse {
        enabled: state.maintenance.is_enabled(),
        blocked: state.maintenance.is_system_blocked(permissions.role()),
        persisted: None,
    })
}

pub async fn set_maintenance(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    permissions: Permissions,
    Json(req): Json<SetMaintenanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::AccessMaintenance)?;

    let persisted = state.maintenance.set_maintenance_mode(req.enabled).await;
    state.audit.action(
        &user,
        if req.enabled {
            "maintenance.enable"
        } else {
            "maintenance.disable"
        },
        "maintenance",
    );

    Ok(Json(MaintenanceStatusResponse {
        enabled: state.maintenance.is_enabled(),
        blocked: state.maintenance.is_system_blocked(Some(user.role)),
        persisted: Some(persisted),
    }))
}
