//! API key resolution.
//!
//! Resolution order:
//! 1. `TVDB_API_KEY` environment variable
//! 2. `api_key` in the `[api]` section (with a warning at load time)

use crate::error::{ConfigError, Result};
use crate::types::TvdbConfig;

/// Environment variable holding the TheTVDB API key.
pub const API_KEY_ENV: &str = "TVDB_API_KEY";

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext — not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the API key from the environment, then the config value.
pub fn resolve_api_key(config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve_with(config_value, |var| std::env::var(var).ok())
}

/// Resolve the API key or fail with [`ConfigError::ApiKeyNotFound`].
pub fn require_api_key(config: &TvdbConfig) -> Result<ResolvedSecret> {
    require_api_key_with(config, |var| std::env::var(var).ok())
}

/// Like [`require_api_key`], reading environment variables through `env`.
pub fn require_api_key_with<F>(config: &TvdbConfig, env: F) -> Result<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    resolve_with(config.api.api_key.as_deref(), env).ok_or_else(|| {
        ConfigError::ApiKeyNotFound {
            env_var: API_KEY_ENV.to_string(),
        }
    })
}

fn resolve_with<F>(config_value: Option<&str>, env: F) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(API_KEY_ENV)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(API_KEY_ENV.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}
