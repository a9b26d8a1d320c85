//! Configuration system for the TheTVDB caching access layer.
//!
//! Provides TOML-based configuration with:
//! - `[api]` connection settings (endpoint, language, timeout, API key)
//! - `[cache]` lifetimes (entry TTL, token refresh threshold, cleanup sweep)
//! - Config file layering (user config dir + project-local `tvdb.toml`)
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{
    API_KEY_ENV, ResolvedSecret, SecretSource, require_api_key, require_api_key_with,
    resolve_api_key,
};
pub use types::*;
