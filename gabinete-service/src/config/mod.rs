use gabinete_core::config::{self as core_config, ServerConfig};
use gabinete_core::error::AppError;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GabineteConfig {
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    /// OTLP collector; span export is off when unset.
    pub otlp_endpoint: Option<String>,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
    pub bootstrap_admin: BootstrapAdminConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

/// Session tokens issued by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 key shared with the identity provider.
    pub jwt_secret: Secret<String>,
    pub token_expiry_minutes: i64,
    pub issuer: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub interval_seconds: u64,
}

/// Administrator guaranteed to exist at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl GabineteConfig {
    /// Defaults, then `configuration.*` (or `$APP_CONFIG_FILE`), then `APP__*`
    /// environment variables, e.g. `APP__AUTH__JWT_SECRET`.
    pub fn load() -> Result<Self, AppError> {
        let defaults = core_config::builder()
            .set_default("environment", "dev")?
            .set_default("service_name", "gabinete-service")?
            .set_default("service_version", env!("CARGO_PKG_VERSION"))?
            .set_default("log_level", "info")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_expiry_minutes", 480)?
            .set_default("auth.issuer", "gabinete-digital")?
            .set_default("storage.backend", "memory")?
            .set_default("scheduler.interval_seconds", 60)?
            .set_default("bootstrap_admin.name", "Administrador")?
            .set_default("bootstrap_admin.email", "admin@gabinete.local")?
            .set_default("security.allowed_origins", vec!["http://localhost:3000"])?;

        let config: Self = core_config::load(defaults, &["security.allowed_origins"])?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.server.port == 0 {
            return Err(config_error("server.port must be non-zero"));
        }
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(config_error("auth.jwt_secret must be set"));
        }
        if self.auth.token_expiry_minutes <= 0 {
            return Err(config_error("auth.token_expiry_minutes must be positive"));
        }
        if self.scheduler.interval_seconds == 0 {
            return Err(config_error("scheduler.interval_seconds must be non-zero"));
        }
        if self.storage.backend == StorageBackend::Redis
            && self.storage.redis_url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(config_error("storage.redis_url is required for the redis backend"));
        }
        if self.is_prod() && self.security.allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err(config_error("wildcard CORS origin is not allowed in production"));
        }
        Ok(())
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }
}

fn config_error(msg: &str) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(msg.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> GabineteConfig {
        GabineteConfig {
            environment: Environment::Dev,
            service_name: "gabinete-service".to_string(),
            service_version: "test".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            server: ServerConfig::default(),
            auth: AuthConfig {
                jwt_secret: Secret::new("test-secret".to_string()),
                token_expiry_minutes: 60,
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
                email: "admin@gabinete.local".to_string(),
            },
            security: SecurityConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    #[test]
    fn test_sample_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut c = sample();
        c.server.port = 0;
        assert!(c.validate().is_err());

        let mut c = sample();
        c.auth.jwt_secret = Secret::new("  ".to_string());
        assert!(c.validate().is_err());

        let mut c = sample();
        c.scheduler.interval_seconds = 0;
        assert!(c.validate().is_err());

        let mut c = sample();
        c.storage.backend = StorageBackend::Redis;
        assert!(c.validate().is_err());
        c.storage.redis_url = Some("redis://127.0.0.1:6379".to_string());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_wildcard_origin_only_rejected_in_prod() {
        let mut c = sample();
        c.security.allowed_origins = vec!["*".to_string()];
        assert!(c.validate().is_ok());

        c.environment = Environment::Prod;
        assert!(c.validate().is_err());
    }
}
