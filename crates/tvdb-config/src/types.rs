//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [api]
//! base_url = "https://api.thetvdb.com"
//! language = "en"
//! timeout_secs = 30
//!
//! [cache]
//! ttl_secs = 3600
//! refresh_threshold_secs = 72000
//! cleanup_interval_secs = 300
//! ```
//!
//! Every field is optional so that partial layers (a project-local file that
//! only overrides `language`, say) can be merged on top of the user config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Public TheTVDB v2 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.thetvdb.com";

/// Default `Accept-Language` for lookups.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default lifetime of a cached lookup (1 hour).
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Default token age that triggers a refresh (20 hours; tokens live 24).
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 20 * 60 * 60;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvdbConfig {
    /// Remote API settings.
    pub api: ApiConfig,

    /// Cache and session lifetimes.
    pub cache: CacheSection,
}

impl TvdbConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority, field by field).
    pub fn merge(&mut self, other: TvdbConfig) {
        self.api.merge(other.api);
        self.cache.merge(other.cache);
    }

    /// Reject values that would make the cache or client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.api.language().is_empty() {
            return Err(invalid("api.language", "must not be empty"));
        }
        if self.api.timeout().is_zero() {
            return Err(invalid("api.timeout_secs", "must be greater than zero"));
        }
        if self.cache.ttl().is_zero() {
            return Err(invalid("cache.ttl_secs", "must be greater than zero"));
        }
        if self.cache.refresh_threshold().is_zero() {
            return Err(invalid(
                "cache.refresh_threshold_secs",
                "must be greater than zero",
            ));
        }
        if self.cache.cleanup_interval().is_some_and(|d| d.is_zero()) {
            return Err(invalid(
                "cache.cleanup_interval_secs",
                "must be greater than zero when set",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [api]
// ─────────────────────────────────────────────────────────────────────────────

/// Remote API connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API endpoint; defaults to [`DEFAULT_BASE_URL`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key in plaintext. Prefer the `TVDB_API_KEY` environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Language applied to every lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Whether the API key is stored in the file itself.
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn merge(&mut self, other: ApiConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.language.is_some() {
            self.language = other.language;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [cache]
// ─────────────────────────────────────────────────────────────────────────────

/// Cache entry and session lifetimes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Seconds a lookup result stays cached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,

    /// Token age in seconds after which the session is refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_threshold_secs: Option<u64>,

    /// Interval between background sweeps of expired entries.
    /// Unset means expired entries are only dropped when read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_interval_secs: Option<u64>,
}

impl CacheSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.unwrap_or(DEFAULT_TTL_SECS))
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(
            self.refresh_threshold_secs
                .unwrap_or(DEFAULT_REFRESH_THRESHOLD_SECS),
        )
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.cleanup_interval_secs.map(Duration::from_secs)
    }

    fn merge(&mut self, other: CacheSection) {
        if other.ttl_secs.is_some() {
            self.ttl_secs = other.ttl_secs;
        }
        if other.refresh_threshold_secs.is_some() {
            self.refresh_threshold_secs = other.refresh_threshold_secs;
        }
        if other.cleanup_interval_secs.is_some() {
            self.cleanup_interval_secs = other.cleanup_interval_secs;
        }
    }
}
