use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use gabinete_core::error::AppError;

use crate::services::Session;
use crate::AppState;

/// Routes that stay reachable while the system is blocked, so clients can
/// probe health, log in and find out why they are locked out.
fn is_exempt(method: &Method, path: &str) -> bool {
    match path {
        "/health" | "/metrics" | "/login" => true,
        "/me" | "/maintenance" => method == Method::GET,
        _ => false,
    }
}

/// Answer `503` to every non-admin caller while maintenance mode is on.
pub async fn maintenance_gate_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if is_exempt(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let role = req
        .extensions()
        .get::<Session>()
        .and_then(Session::user)
        .map(|user| user.role);

    if state.maintenance.is_system_blocked(role) {
        tracing::debug!(path = %req.uri().path(), role = ?role, "Request blocked by maintenance mode");
        return AppError::SystemBlocked.into_response();
    }

    next.run(req).await
}
