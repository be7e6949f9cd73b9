//! User management. Who may touch which account follows the caller's role:
//! administrators manage everyone, chefes de gabinete only assessores and
//! visualizadores.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gabinete_core::error::AppError;
use uuid::Uuid;

use crate::access::Permissions;
use crate::dtos::users::{CreateUserRequest, UpdateUserRequest, UserListResponse};
use crate::middleware::AuthUser;
use crate::models::{AuditEntry, Capability, Role};
use crate::utils::ValidatedJson;
use crate::AppState;

fn role_denied(action: &str, role: Role) -> AppError {
    AppError::forbidden(format!(
        "Sem permissão para {} usuários com o perfil {}",
        action,
        role.label()
    ))
}

pub async fn list_users(
    State(state): State<AppState>,
    permissions: Permissions,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ManageUsers)?;

    let users = state.users.list();
    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ManageUsers)?;
    if !permissions.can_create_user_role(req.role) {
        return Err(role_denied("criar", req.role));
    }

    let user = state.users.create(&req.name, &req.email, req.role)?;
    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "user.create", user.id.to_string())
            .with_details(format!("role={}", user.role)),
    );

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ManageUsers)?;

    let target = state.users.find(id)?;
    if !permissions.can_edit_user_role(target.role) {
        return Err(role_denied("editar", target.role));
    }
    if let Some(new_role) = req.role {
        if new_role != target.role && !permissions.can_edit_user_role(new_role) {
            return Err(role_denied("atribuir a", new_role));
        }
    }

    let role_change = req
        .role
        .filter(|r| *r != target.role)
        .map(|r| format!("role {} -> {}", target.role, r));

    let user = state.users.update(id, req)?;
    let mut entry = AuditEntry::new(actor.id, actor.role, "user.update", id.to_string());
    if let Some(change) = role_change {
        entry = entry.with_details(change);
    }
    state.audit.record(entry);

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::ManageUsers)?;

    if id == actor.id {
        return Err(AppError::forbidden("Não é possível excluir o próprio usuário"));
    }
    let target = state.users.find(id)?;
    if !permissions.can_delete_user_role(target.role) {
        return Err(role_denied("excluir", target.role));
    }

    state.users.delete(id)?;
    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "user.delete", id.to_string())
            .with_details(format!("role={}", target.role)),
    );

    Ok(StatusCode::NO_CONTENT)
}
