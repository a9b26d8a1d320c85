//! Token-refreshing, memoizing access layer over the TheTVDB client.
//!
//! This crate sits between callers and [`tvdb_client::TvdbClient`] with:
//! - [`TokenGuardian`]: lazy authentication, token refresh after a
//!   configurable age, and re-authentication when a refresh is rejected
//! - [`MemoizingGate`]: a TTL cache where concurrent misses for one key
//!   produce a single remote call, and failures are never cached
//! - [`TvdbClientManager`]: one method per lookup, keyed by [`CacheKey`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tvdb_cache::{GateConfig, TvdbClientManager};
//!
//! let client = TvdbClient::builder().build()?;
//! let config = GateConfig::new()
//!     .with_ttl(Duration::from_secs(600))
//!     .with_language("de");
//!
//! let manager = Arc::new(TvdbClientManager::new(client, api_key, config));
//! let series = manager.series(121361, &CancellationToken::new()).await?;
//! ```

mod config;
mod error;
mod gate;
mod guardian;
mod key;
mod manager;

pub use config::{DEFAULT_LANGUAGE, DEFAULT_REFRESH_THRESHOLD, DEFAULT_TTL, GateConfig};
pub use error::{Error, Result};
pub use gate::{CacheStats, MemoizingGate};
pub use guardian::{SessionClient, TokenGuardian};
pub use key::CacheKey;
pub use manager::TvdbClientManager;
