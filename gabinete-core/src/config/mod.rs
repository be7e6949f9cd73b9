use crate::error::AppError;
use config::{Config as Cfg, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::{Deserialize, de::DeserializeOwned};

/// Environment variable naming an alternative configuration file.
pub const CONFIG_FILE_ENV: &str = "APP_CONFIG_FILE";

/// Prefix for environment overrides, e.g. `APP__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "APP";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Start a builder; services register their defaults on it before calling [`load`].
pub fn builder() -> ConfigBuilder<DefaultState> {
    Cfg::builder()
}

/// Layer the optional configuration file and `APP__` environment variables on
/// top of `defaults` and deserialize the result.
///
/// `list_keys` names settings that accept comma-separated lists from the
/// environment.
pub fn load<T: DeserializeOwned>(
    defaults: ConfigBuilder<DefaultState>,
    list_keys: &[&str],
) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| "configuration".to_string());

    let mut env = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true);
    if !list_keys.is_empty() {
        env = env.list_separator(",");
        for key in list_keys {
            env = env.with_list_parse_key(key);
        }
    }

    let settings = defaults
        .add_source(File::with_name(&file).required(false))
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}
