use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use gabinete_core::error::AppError;

use crate::access::{GuardDecision, Permissions, RouteGuard};
use crate::models::CurrentUser;
use crate::services::{metrics, Session};
use crate::AppState;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "gabinete_token";

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve the caller once per request and store the [`Session`] in the
/// request extensions for the gate, the guards and the extractors.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token(req.headers());
    let session = state.identity.resolve(token.as_deref()).await;
    req.extensions_mut().insert(session);

    next.run(req).await
}

/// Apply a [`RouteGuard`] to the routes it is layered on.
pub async fn route_guard_middleware(
    State(guard): State<RouteGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .unwrap_or(Session::Anonymous);
    let location = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let decision = guard.evaluate(session.status(), &location);
    metrics::record_guard_decision(decision.as_str());

    match decision {
        GuardDecision::Allow => {
            if let Some(user) = session.into_user() {
                req.extensions_mut().insert(user);
            }
            next.run(req).await
        }
        GuardDecision::Loading => AppError::ServiceUnavailable {
            reason: "Sessão ainda em verificação".to_string(),
            retry_after: Some(1),
        }
        .into_response(),
        redirect => {
            tracing::debug!(decision = redirect.as_str(), location = %location, "Route guard redirect");
            match redirect.location() {
                Some(target) => Redirect::to(&target).into_response(),
                None => AppError::forbidden("Acesso negado").into_response(),
            }
        }
    }
}

/// The authenticated caller. Rejects with `401` on routes where the guard
/// let an anonymous caller through.
pub struct AuthUser(pub CurrentUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(AuthUser(user.clone()));
        }
        parts
            .extensions
            .get::<Session>()
            .and_then(Session::user)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))
    }
}

/// Permission resolver bound to the caller (anonymous callers get one that
/// denies everything).
#[axum::async_trait]
impl FromRequestParts<AppState> for Permissions {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<Session>()
            .and_then(Session::user)
            .cloned();
        Ok(Permissions::new(user, state.policy.clone()))
    }
}
