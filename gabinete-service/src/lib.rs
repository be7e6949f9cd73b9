pub mod access;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod maintenance;
pub mod middleware;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, put},
    Router,
};
use gabinete_core::error::AppError;
use gabinete_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::access::{PolicyTable, RouteGuard};
use crate::config::GabineteConfig;
use crate::maintenance::{KeyValueStore, MaintenanceStore};
use crate::middleware::{
    maintenance_gate_middleware, metrics_middleware, route_guard_middleware, session_middleware,
};
use crate::models::Role;
use crate::services::{AuditLog, IdentityProvider, JwtIdentityProvider, Registry, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GabineteConfig>,
    pub policy: Arc<PolicyTable>,
    pub identity: Arc<dyn IdentityProvider>,
    pub users: Arc<UserDirectory>,
    pub registry: Arc<Registry>,
    pub audit: Arc<AuditLog>,
    pub maintenance: Arc<MaintenanceStore>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// Wire every component over `storage` and seed the bootstrap admin.
    pub async fn new(
        config: GabineteConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let users = Arc::new(UserDirectory::new());
        let admin = users.ensure_admin(&config.bootstrap_admin.name, &config.bootstrap_admin.email)?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "Bootstrap administrator ready");

        let identity = Arc::new(JwtIdentityProvider::new(&config.auth, users.clone()));
        let maintenance = Arc::new(MaintenanceStore::load(storage.clone()).await);

        Ok(Self {
            config: Arc::new(config),
            policy: Arc::new(PolicyTable::standard()),
            identity,
            users,
            registry: Arc::new(Registry::new()),
            audit: Arc::new(AuditLog::default()),
            maintenance,
            storage,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let authenticated = from_fn_with_state(RouteGuard::authenticated(), route_guard_middleware);
    let managers = from_fn_with_state(
        RouteGuard::roles(&[Role::Admin, Role::ChefeGabinete]),
        route_guard_middleware,
    );
    let admins = from_fn_with_state(RouteGuard::roles(&[Role::Admin]), route_guard_middleware);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/login", get(handlers::session::login))
        .route(
            "/maintenance",
            get(handlers::maintenance::get_maintenance).merge(
                put(handlers::maintenance::set_maintenance).route_layer(admins.clone()),
            ),
        );

    let app_routes = Router::new()
        .route("/dashboard", get(handlers::session::dashboard))
        .route("/me", get(handlers::session::me))
        .route(
            "/people",
            get(handlers::people::list_people).post(handlers::people::create_person),
        )
        .route("/people/export", get(handlers::people::export_people))
        .route(
            "/people/:id",
            get(handlers::people::get_person)
                .patch(handlers::people::update_person)
                .delete(handlers::people::delete_person),
        )
        .route(
            "/interactions",
            get(handlers::interactions::list_interactions)
                .post(handlers::interactions::create_interaction),
        )
        .route(
            "/interactions/export",
            get(handlers::interactions::export_interactions),
        )
        .route(
            "/interactions/:id",
            get(handlers::interactions::get_interaction)
                .patch(handlers::interactions::update_interaction)
                .delete(handlers::interactions::delete_interaction),
        )
        .route("/reports/summary", get(handlers::reports::summary))
        .route("/audit-logs", get(handlers::reports::audit_logs))
        .route_layer(authenticated);

    let user_routes = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/:id",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route_layer(managers);

    let admin_routes = Router::new()
        .route("/admin/backup", get(handlers::admin::backup))
        .route_layer(admins);

    Router::new()
        .merge(public_routes)
        .merge(app_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.clone(),
            maintenance_gate_middleware,
        ))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| {
            o.trim()
                .parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}
