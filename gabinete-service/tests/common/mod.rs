//! Shared setup for the router-level integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use gabinete_service::{
    build_router,
    config::{
        AuthConfig, BootstrapAdminConfig, Environment, GabineteConfig, SchedulerConfig,
        SecurityConfig, StorageBackend, StorageConfig,
    },
    maintenance::MemoryStore,
    models::{Role, User},
    services::{IdentityProvider, JwtIdentityProvider, Session},
    AppState,
};
use gabinete_core::config::ServerConfig;
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@gabinete.test";

pub fn test_config() -> GabineteConfig {
    GabineteConfig {
        environment: Environment::Dev,
        service_name: "gabinete-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        server: ServerConfig::default(),
        auth: AuthConfig {
            jwt_secret: Secret::new("integration-test-secret".to_string()),
            token_expiry_minutes: 30,
            issuer: "gabinete-digital".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            redis_url: None,
        },
        scheduler: SchedulerConfig {
            interval_seconds: 60,
        },
        bootstrap_admin: BootstrapAdminConfig {
            name: "Administrador".to_string(),
            email: ADMIN_EMAIL.to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

/// Identity provider that never settles.
pub struct PendingIdentity;

#[async_trait]
impl IdentityProvider for PendingIdentity {
    async fn resolve(&self, _token: Option<&str>) -> Session {
        Session::Pending
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is not UTF-8")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub storage: MemoryStore,
    tokens: JwtIdentityProvider,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_storage(MemoryStore::new()).await
    }

    /// Several apps over one storage behave like several instances.
    pub async fn with_storage(storage: MemoryStore) -> Self {
        let state = AppState::new(test_config(), Arc::new(storage.clone()))
            .await
            .expect("Failed to build app state");
        let tokens = JwtIdentityProvider::new(&state.config.auth, state.users.clone());
        Self {
            state,
            storage,
            tokens,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue_token(user).expect("Failed to issue token")
    }

    pub fn admin_token(&self) -> String {
        let admin = self
            .state
            .users
            .find_by_email(ADMIN_EMAIL)
            .expect("bootstrap admin missing");
        self.token_for(&admin)
    }

    /// Register a user with `role` and return them with a session token.
    pub fn login_as(&self, role: Role) -> (User, String) {
        let email = format!("{}-{}@gabinete.test", role.as_str(), uuid::Uuid::new_v4());
        let user = self
            .state
            .users
            .create(role.label(), &email, role)
            .expect("Failed to create user");
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }
}
