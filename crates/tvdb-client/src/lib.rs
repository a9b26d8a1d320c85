//! HTTP client SDK for the TheTVDB v2 API.
//!
//! This crate provides a typed client for the read-only metadata lookups
//! used by media scanners: series search, series and episode records, cast,
//! artwork and languages.
//!
//! # Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use tvdb_client::{EpisodeQuery, Result, TvdbClient};
//!
//! # async fn example() -> Result<()> {
//! let client = TvdbClient::builder().language("en").build()?;
//! client.authenticate("my-api-key").await?;
//!
//! let cancel = CancellationToken::new();
//! let hits = client.search().series_by_name("The Expanse", &cancel).await?;
//! for hit in &hits.data {
//!     println!("{} {:?}", hit.id, hit.series_name);
//! }
//!
//! let season = client
//!     .series()
//!     .episodes(280619, 1, &EpisodeQuery::aired_season(1), &cancel)
//!     .await?;
//! println!("{} episodes", season.data.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Authentication
//!
//! [`TvdbClient::authenticate`] exchanges an API key for a bearer token that
//! the client keeps and attaches to every lookup. Tokens are valid for 24
//! hours and can be renewed with [`TvdbClient::refresh_token`].

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, TvdbClient};
pub use error::{Error, Result};
pub use types::*;
