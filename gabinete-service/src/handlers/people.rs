use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use gabinete_core::error::AppError;
use uuid::Uuid;

use crate::access::Permissions;
use crate::dtos::people::{CreatePersonRequest, PersonListResponse, UpdatePersonRequest};
use crate::dtos::SearchQuery;
use crate::middleware::AuthUser;
use crate::models::{AuditEntry, Capability};
use crate::services::export;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let people = state.registry.list_people(query.q.as_deref());
    Json(PersonListResponse {
        total: people.len(),
        people,
    })
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.registry.get_person(id)?))
}

pub async fn create_person(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    ValidatedJson(req): ValidatedJson<CreatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Create)?;

    let person = state.registry.create_person(req, actor.id);
    tracing::info!(person_id = %person.id, user_id = %actor.id, "Person registered");

    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    permissions: Permissions,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Edit)?;
    Ok(Json(state.registry.update_person(id, req)?))
}

pub async fn delete_person(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Delete)?;

    let removed = state.registry.delete_person(id)?;
    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "person.delete", id.to_string())
            .with_details(format!("interactions_removed={}", removed)),
    );

    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_people(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    permissions: Permissions,
) -> Result<impl IntoResponse, AppError> {
    permissions.require(Capability::Export)?;

    let people = state.registry.list_people(None);
    let body = export::people_csv(&people)?;
    state.audit.record(
        AuditEntry::new(actor.id, actor.role, "people.export", "people".to_string())
            .with_details(format!("rows={}", people.len())),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"pessoas.csv\""),
        ],
        body,
    ))
}
