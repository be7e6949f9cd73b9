//! Session resolution: turns the token handed out by the identity provider
//! into the `{id, name, email, role}` the access-control core works with.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ServiceError;
use super::users::UserDirectory;
use crate::access::AuthStatus;
use crate::config::AuthConfig;
use crate::models::{CurrentUser, Role, User};

/// Outcome of resolving a request's session.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    /// The provider has not settled yet.
    Pending,
    Anonymous,
    Authenticated(CurrentUser),
}

impl Session {
    pub fn status(&self) -> AuthStatus {
        match self {
            Session::Pending => AuthStatus::Loading,
            Session::Anonymous => AuthStatus::Anonymous,
            Session::Authenticated(user) => AuthStatus::Authenticated(user.role),
        }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn into_user(self) -> Option<CurrentUser> {
        match self {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the session token, if any, carried by a request.
    async fn resolve(&self, token: Option<&str>) -> Session;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// HS256 session tokens, checked against the user directory.
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expiry_minutes: i64,
    directory: Arc<UserDirectory>,
}

impl JwtIdentityProvider {
    pub fn new(config: &AuthConfig, directory: Arc<UserDirectory>) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        tracing::info!(issuer = %config.issuer, "Session token verification initialized");

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            expiry_minutes: config.token_expiry_minutes,
            directory,
        }
    }

    /// Sign a session token for `user`, as the identity provider would.
    pub fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            exp: (now + Duration::minutes(self.expiry_minutes)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e).into())
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                ServiceError::InvalidToken
            })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::Anonymous;
        };
        let Ok(claims) = self.validate_token(token) else {
            return Session::Anonymous;
        };
        let Ok(id) = Uuid::parse_str(&claims.sub) else {
            tracing::warn!(sub = %claims.sub, "Session token with malformed subject");
            return Session::Anonymous;
        };

        // The directory, not the token, decides the role.
        match self.directory.get(id) {
            Some(user) if user.active => {
                if user.role != claims.role {
                    tracing::debug!(
                        user_id = %id,
                        token_role = %claims.role,
                        role = %user.role,
                        "Role changed since token was issued"
                    );
                }
                Session::Authenticated(user.identity())
            }
            Some(_) => {
                tracing::debug!(user_id = %id, "Session for inactive user");
                Session::Anonymous
            }
            None => {
                tracing::debug!(user_id = %id, "Session for unknown user");
                Session::Anonymous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::users::UpdateUserRequest;
    use secrecy::Secret;

    fn provider(directory: Arc<UserDirectory>) -> JwtIdentityProvider {
        JwtIdentityProvider::new(
            &AuthConfig {
                jwt_secret: Secret::new("test-secret".to_string()),
                token_expiry_minutes: 60,
                issuer: "gabinete-digital".to_string(),
            },
            directory,
        )
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let directory = Arc::new(UserDirectory::new());
        let user = directory.create("Ana", "ana@camara.gov.br", Role::Assessor).unwrap();
        let provider = provider(directory);

        let token = provider.issue_token(&user).unwrap();
        let session = provider.resolve(Some(&token)).await;

        assert_eq!(session, Session::Authenticated(user.identity()));
        assert_eq!(session.status(), AuthStatus::Authenticated(Role::Assessor));
    }

    #[tokio::test]
    async fn test_missing_or_garbage_token_is_anonymous() {
        let provider = provider(Arc::new(UserDirectory::new()));

        assert_eq!(provider.resolve(None).await, Session::Anonymous);
        assert_eq!(provider.resolve(Some("not-a-jwt")).await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let directory = Arc::new(UserDirectory::new());
        let user = directory.create("Ana", "ana@camara.gov.br", Role::Admin).unwrap();
        let forged = JwtIdentityProvider::new(
            &AuthConfig {
                jwt_secret: Secret::new("other-secret".to_string()),
                token_expiry_minutes: 60,
                issuer: "gabinete-digital".to_string(),
            },
            directory.clone(),
        )
        .issue_token(&user)
        .unwrap();

        assert_eq!(provider(directory).resolve(Some(&forged)).await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_directory_role_wins_over_token() {
        let directory = Arc::new(UserDirectory::new());
        let user = directory.create("Ana", "ana@camara.gov.br", Role::Admin).unwrap();
        let provider = provider(directory.clone());
        let token = provider.issue_token(&user).unwrap();

        directory
            .update(
                user.id,
                UpdateUserRequest {
                    role: Some(Role::Visualizador),
                    ..Default::default()
                },
            )
            .unwrap();

        let session = provider.resolve(Some(&token)).await;
        assert_eq!(session.user().map(|u| u.role), Some(Role::Visualizador));
    }

    #[tokio::test]
    async fn test_deleted_or_inactive_user_is_anonymous() {
        let directory = Arc::new(UserDirectory::new());
        let ana = directory.create("Ana", "ana@camara.gov.br", Role::Assessor).unwrap();
        let bruno = directory.create("Bruno", "bruno@camara.gov.br", Role::Assessor).unwrap();
        let provider = provider(directory.clone());
        let ana_token = provider.issue_token(&ana).unwrap();
        let bruno_token = provider.issue_token(&bruno).unwrap();

        directory.delete(ana.id).unwrap();
        directory
            .update(
                bruno.id,
                UpdateUserRequest {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(provider.resolve(Some(&ana_token)).await, Session::Anonymous);
        assert_eq!(provider.resolve(Some(&bruno_token)).await, Session::Anonymous);
    }
}
