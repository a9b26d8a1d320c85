//! Configuration for the memoizing gate and token guardian.

use std::time::Duration;

use tvdb_config::TvdbConfig;

/// Default lifetime of a cached lookup.
pub const DEFAULT_TTL: Duration = Duration::from_secs(tvdb_config::DEFAULT_TTL_SECS);

/// Default token age that triggers a refresh.
pub const DEFAULT_REFRESH_THRESHOLD: Duration =
    Duration::from_secs(tvdb_config::DEFAULT_REFRESH_THRESHOLD_SECS);

/// Default language applied to handed-out clients.
pub const DEFAULT_LANGUAGE: &str = tvdb_config::DEFAULT_LANGUAGE;

/// Lifetimes and defaults for the access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// How long a successful lookup stays cached.
    pub ttl: Duration,

    /// Session age at which the token is refreshed before use.
    pub refresh_threshold: Duration,

    /// Language set on the client at every acquisition.
    pub language: String,

    /// Interval of the background sweep of expired entries.
    /// `None` leaves expiry purely lazy.
    pub cleanup_interval: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            language: DEFAULT_LANGUAGE.to_string(),
            cleanup_interval: None,
        }
    }
}

impl GateConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a loaded [`TvdbConfig`].
    pub fn from_config(config: &TvdbConfig) -> Self {
        Self {
            ttl: config.cache.ttl(),
            refresh_threshold: config.cache.refresh_threshold(),
            language: config.api.language().to_string(),
            cleanup_interval: config.cache.cleanup_interval(),
        }
    }

    /// Set the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the token refresh threshold.
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Set the language applied at acquisition.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enable the background sweep.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }
}
