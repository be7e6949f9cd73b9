use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use gabinete_core::error::AppError;
use uuid::Uuid;

use crate::access::Permissions;
use crate::dtos::interactions::{
    CreateInteractionRequest, InteractionListResponse, InteractionQuery, UpdateInteractionRequest,
};
use crate::middleware::AuthUser;
use crate::models::{AuditEntry, Capability};
use crate::services::export;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn list_interactions(
    State(state): State<AppState>,
    Query(query): Query<InteractionQuery>,
) -> impl IntoResponse {
    let interactions = state.registry.list_interactions(&query);
    Json(InteractionListResponse {
        total: interactions.len(),
        interactions,
    })
}

pub async fn get_interaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.registry.get_interaction(id)?))
}

pub async fn create_interaction(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    ValidatedJson(req): ValidatedJson<CreateInteractionRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Create)?;

    let interaction = state.registry.create_interaction(req, actor.id)?;
    tracing::info!(
        interaction_id = %interaction.id,
        person_id = %interaction.person_id,
        status = interaction.status.as_str(),
        "Interaction logged"
    );

    Ok((StatusCode::CREATED, Json(interaction)))
}

pub async fn update_interaction(
    State(state): State<AppState>,
    permissions: Permissions,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateInteractionRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Edit)?;
    Ok(Json(state.registry.update_interaction(id, req)?))
}

pub async fn delete_interaction(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Delete)?;

    state.registry.delete_interaction(id)?;
    state.audit.record(AuditEntry::new(
        actor.id,
        actor.role,
        "interaction.delete",
        id.to_string(),
    ));

    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_interactions(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    Query(query): Query<InteractionQuery>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Export)?;

    let interactions = state.registry.list_interactions(&query);
    let body = export::interactions_csv(&interactions)?;
    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "interactions.export", "interactions".to_string())
            .with_details(format!("rows={}", interactions.len())),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"interacoes.csv\"",
            ),
        ],
        body,
    ))
}
