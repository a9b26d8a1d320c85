//! Caller-facing lookups.
//!
//! Every lookup derives a [`CacheKey`] from its arguments, answers from the
//! [`MemoizingGate`] when it can, and otherwise acquires a session from the
//! [`TokenGuardian`] and runs the remote call once.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tvdb_client::{
    Actor, EpisodeQuery, EpisodeRecord, EpisodesSummary, Image, ImagesQuery, Language, Series,
    SeriesSearchResult, TvdbClient, TvdbResponse,
};
use tvdb_config::{SecretSource, TvdbConfig};

use crate::config::GateConfig;
use crate::error::Result;
use crate::gate::{CacheStats, MemoizingGate};
use crate::guardian::TokenGuardian;
use crate::key::CacheKey;

/// Token-refreshing, memoizing access to TheTVDB.
///
/// Share it behind an `Arc`; all methods take `&self`.
///
/// # Example
///
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use tvdb_cache::TvdbClientManager;
///
/// # async fn example() -> tvdb_cache::Result<()> {
/// let loaded = tvdb_config::load_config(None)?;
/// let manager = TvdbClientManager::from_config(&loaded.config)?;
///
/// let cancel = CancellationToken::new();
/// let hits = manager.series_by_name("Firefly", &cancel).await?;
/// // Answered from the cache.
/// let again = manager.series_by_name("Firefly", &cancel).await?;
/// assert_eq!(hits.data.len(), again.data.len());
/// # Ok(())
/// # }
/// ```
pub struct TvdbClientManager {
    guardian: TokenGuardian<TvdbClient>,
    gate: Arc<MemoizingGate>,
    config: GateConfig,
    cleanup: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TvdbClientManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvdbClientManager")
            .field("guardian", &self.guardian)
            .field("gate", &self.gate)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

impl TvdbClientManager {
    /// Wrap an unauthenticated client.
    ///
    /// Nothing is sent until the first lookup. When
    /// `config.cleanup_interval` is set to a non-zero interval a sweep task
    /// is spawned, which requires a Tokio runtime.
    pub fn new(client: TvdbClient, api_key: impl Into<String>, config: GateConfig) -> Self {
        let guardian = TokenGuardian::new(client, api_key, &config);
        let gate = Arc::new(MemoizingGate::new(config.ttl));
        let cleanup = config
            .cleanup_interval
            .and_then(|interval| gate.spawn_cleanup_task(interval));

        debug!(
            ttl_secs = config.ttl.as_secs(),
            refresh_threshold_secs = config.refresh_threshold.as_secs(),
            language = %config.language,
            "Client manager created"
        );

        Self {
            guardian,
            gate,
            config,
            cleanup,
        }
    }

    /// Build the client and manager from a configuration.
    ///
    /// The configuration is validated first. The API key is resolved from
    /// `TVDB_API_KEY`, then the `[api]` section.
    pub fn from_config(config: &TvdbConfig) -> Result<Self> {
        Self::from_config_with_env(config, |var| std::env::var(var).ok())
    }

    fn from_config_with_env<F>(config: &TvdbConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        config.validate()?;
        let secret = tvdb_config::require_api_key_with(config, env)?;
        if secret.source == SecretSource::ConfigFile {
            warn!(
                "Using a plaintext API key from the config file; set {} instead",
                tvdb_config::API_KEY_ENV
            );
        } else {
            info!(source = %secret.source, "Resolved TheTVDB API key");
        }

        let client = TvdbClient::builder()
            .base_url(config.api.base_url())
            .timeout(config.api.timeout())
            .language(config.api.language())
            .build()?;

        Ok(Self::new(client, secret.value, GateConfig::from_config(config)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Search series by name.
    pub async fn series_by_name(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        let key = CacheKey::new("search_series_name").arg(name);
        self.cached(key, cancel, |c| async move {
            c.search().series_by_name(name, cancel).await
        })
        .await
    }

    /// Search series by IMDb id.
    pub async fn series_by_imdb_id(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        let key = CacheKey::new("search_series_imdb").arg(imdb_id);
        self.cached(key, cancel, |c| async move {
            c.search().series_by_imdb_id(imdb_id, cancel).await
        })
        .await
    }

    /// Search series by Zap2it id.
    pub async fn series_by_zap2it_id(
        &self,
        zap2it_id: &str,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        let key = CacheKey::new("search_series_zap2it").arg(zap2it_id);
        self.cached(key, cancel, |c| async move {
            c.search().series_by_zap2it_id(zap2it_id, cancel).await
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a series record.
    pub async fn series(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Series>> {
        let key = CacheKey::new("series").arg(id);
        self.cached(key, cancel, |c| async move { c.series().get(id, cancel).await })
            .await
    }

    /// Get an episode record.
    pub async fn episode(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<EpisodeRecord>> {
        let key = CacheKey::new("episode").arg(id);
        self.cached(key, cancel, |c| async move { c.episodes().get(id, cancel).await })
            .await
    }

    /// Get the cast of a series.
    pub async fn actors(
        &self,
        series_id: u32,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<Actor>>> {
        let key = CacheKey::new("actors").arg(series_id);
        self.cached(key, cancel, |c| async move {
            c.series().actors(series_id, cancel).await
        })
        .await
    }

    /// Query artwork of a series. Each filter combination is cached separately.
    pub async fn images(
        &self,
        series_id: u32,
        query: &ImagesQuery,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<Image>>> {
        let key = CacheKey::new("images")
            .arg(series_id)
            .filter("keyType", query.key_type.as_deref())
            .filter("resolution", query.resolution.as_deref())
            .filter("subKey", query.sub_key.as_deref());
        self.cached(key, cancel, |c| async move {
            c.series().images(series_id, query, cancel).await
        })
        .await
    }

    /// All languages supported by the API.
    pub async fn languages(
        &self,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<Language>>> {
        let key = CacheKey::new("languages");
        self.cached(key, cancel, |c| async move { c.languages().all(cancel).await })
            .await
    }

    /// Season and episode counts of a series.
    pub async fn episode_summary(
        &self,
        series_id: u32,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<EpisodesSummary>> {
        let key = CacheKey::new("series_episode_summary").arg(series_id);
        self.cached(key, cancel, |c| async move {
            c.series().episodes_summary(series_id, cancel).await
        })
        .await
    }

    /// One page of a series' episodes matching `query`. Pages start at 1.
    pub async fn episodes_page(
        &self,
        series_id: u32,
        page: u32,
        query: &EpisodeQuery,
        cancel: &CancellationToken,
    ) -> tvdb_client::Result<TvdbResponse<Vec<EpisodeRecord>>> {
        let key = CacheKey::new("episodes_page")
            .arg(series_id)
            .filter("page", Some(page))
            .filter("absoluteNumber", query.absolute_number)
            .filter("airedSeason", query.aired_season)
            .filter("airedEpisode", query.aired_episode)
            .filter("dvdSeason", query.dvd_season)
            .filter("dvdEpisode", query.dvd_episode)
            .filter("imdbId", query.imdb_id.as_deref());
        self.cached(key, cancel, |c| async move {
            c.series().episodes(series_id, page, query, cancel).await
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the configuration in effect.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Get the session guardian.
    pub fn guardian(&self) -> &TokenGuardian<TvdbClient> {
        &self.guardian
    }

    /// Get the lookup cache.
    pub fn gate(&self) -> &MemoizingGate {
        &self.gate
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.gate.stats()
    }

    /// Drop every cached lookup. The session is kept.
    pub fn clear_cache(&self) {
        self.gate.clear();
    }

    /// Drop the session so the next miss authenticates again.
    pub async fn invalidate_session(&self) {
        self.guardian.invalidate().await;
    }

    /// Serve `key` from the cache or run `call` with an authenticated client.
    ///
    /// The whole lookup, including the wait for the miss lock and any
    /// authentication, is abandoned when `cancel` fires.
    async fn cached<T, F, Fut>(
        &self,
        key: CacheKey,
        cancel: &CancellationToken,
        call: F,
    ) -> tvdb_client::Result<TvdbResponse<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(TvdbClient) -> Fut,
        Fut: Future<Output = tvdb_client::Result<TvdbResponse<T>>>,
    {
        let guardian = &self.guardian;
        let fetch = self.gate.fetch(key.as_str(), || async move {
            let client = guardian.acquire_client().await?;
            call(client).await
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(key = %key, "Lookup cancelled");
                Err(tvdb_client::Error::Cancelled)
            }
            result = fetch => result,
        }
    }
}

impl Drop for TvdbClientManager {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup.take() {
            handle.abort();
        }
    }
}
