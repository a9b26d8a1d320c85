//! Error types for building the access layer.
//!
//! Lookups never produce these: remote failures are returned unchanged as
//! [`tvdb_client::Error`].

/// Error raised while assembling a [`TvdbClientManager`](crate::TvdbClientManager).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be resolved (missing API key, invalid value).
    #[error("Config error: {0}")]
    Config(#[from] tvdb_config::ConfigError),

    /// The HTTP client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] tvdb_client::Error),
}

/// Result type for setup operations.
pub type Result<T> = std::result::Result<T, Error>;
