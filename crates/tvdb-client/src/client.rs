//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::{EpisodesApi, LanguagesApi, SearchApi, SeriesApi};
use crate::error::{Error, ErrorResponse, Result};
use crate::types::{LoginRequest, TokenResponse};

pub use tvdb_config::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(tvdb_config::DEFAULT_TIMEOUT_SECS);

/// TheTVDB API client.
///
/// Holds the bearer token obtained by [`authenticate`](Self::authenticate)
/// and the accepted language applied to every lookup. Clones share both.
///
/// # Example
///
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use tvdb_client::TvdbClient;
///
/// # async fn example() -> tvdb_client::Result<()> {
/// let client = TvdbClient::builder().build()?;
/// client.authenticate("my-api-key").await?;
///
/// let series = client.series().get(121361, &CancellationToken::new()).await?;
/// println!("{:?}", series.data.series_name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TvdbClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    token: RwLock<Option<String>>,
    language: RwLock<String>,
}

impl std::fmt::Debug for TvdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvdbClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.has_token())
            .field("language", &*self.inner.language.read())
            .finish()
    }
}

impl TvdbClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Whether a bearer token is currently held.
    pub fn has_token(&self) -> bool {
        self.inner.token.read().is_some()
    }

    /// The language sent as `Accept-Language` on lookups.
    pub fn accepted_language(&self) -> String {
        self.inner.language.read().clone()
    }

    /// Change the language sent as `Accept-Language` on lookups.
    pub fn set_accepted_language(&self, language: &str) {
        let mut current = self.inner.language.write();
        if *current != language {
            *current = language.to_string();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchange an API key for a bearer token and keep it.
    pub async fn authenticate(&self, api_key: &str) -> Result<()> {
        let url = self.url("login")?;
        let body = LoginRequest {
            apikey: api_key.to_string(),
        };
        let response = self
            .inner
            .http
            .post(url)
            .json(&body)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        *self.inner.token.write() = Some(token.token);
        tracing::debug!("Authenticated against {}", self.inner.base_url);
        Ok(())
    }

    /// Trade the current token for a fresh one.
    ///
    /// Fails with [`Error::Auth`] if the client was never authenticated.
    pub async fn refresh_token(&self) -> Result<()> {
        let current = self
            .inner
            .token
            .read()
            .clone()
            .ok_or_else(|| Error::Auth("no token to refresh".to_string()))?;

        let url = self.url("refresh_token")?;
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(current)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        *self.inner.token.write() = Some(token.token);
        tracing::debug!("Refreshed token for {}", self.inner.base_url);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the search API.
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    /// Access the series API.
    pub fn series(&self) -> SeriesApi {
        SeriesApi::new(self.clone())
    }

    /// Access the episodes API.
    pub fn episodes(&self) -> EpisodesApi {
        EpisodesApi::new(self.clone())
    }

    /// Access the languages API.
    pub fn languages(&self) -> LanguagesApi {
        LanguagesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let request = self.authorized_get(path)?;
        self.execute(request, cancel).await
    }

    /// Make an authenticated GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let request = self.authorized_get(path)?.query(query);
        self.execute(request, cancel).await
    }

    fn authorized_get(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.url(path)?;
        let token = self
            .inner
            .token
            .read()
            .clone()
            .ok_or_else(|| Error::Auth("client is not authenticated".to_string()))?;
        let language = self.inner.language.read().clone();

        Ok(self
            .inner
            .http
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT_LANGUAGE, language)
            .timeout(self.inner.timeout))
    }

    /// Send a request and decode its body, abandoning both if `cancel` fires.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let exchange = async {
            let response = request.send().await?;
            self.handle_response(response).await
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = exchange => result,
        }
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.error,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            401 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Builder for creating a [`TvdbClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    language: String,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Override the API base URL (defaults to [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the initial accepted language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<TvdbClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        if self.language.is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("tvdb-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(TvdbClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                token: RwLock::new(None),
                language: RwLock::new(self.language),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_public_endpoint() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.thetvdb.com/");
        assert_eq!(client.accepted_language(), "en");
        assert!(!client.has_token());
    }

    #[test]
    fn test_builder_defaults_follow_config_defaults() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.accepted_language(), tvdb_config::DEFAULT_LANGUAGE);
        assert_eq!(
            client.base_url().as_str().trim_end_matches('/'),
            tvdb_config::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/tvdb")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/tvdb/");
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_rejects_empty_language() {
        let result = ClientBuilder::new().language("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.url("series/42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/series/42");

        let url = client.url("/series/42/actors").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/series/42/actors");
    }

    #[test]
    fn test_language_is_shared_between_clones() {
        let client = ClientBuilder::new().build().unwrap();
        let clone = client.clone();
        clone.set_accepted_language("de");
        assert_eq!(client.accepted_language(), "de");
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails() {
        let client = ClientBuilder::new().build().unwrap();
        let err = client.refresh_token().await.unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_lookup_without_token_fails() {
        let client = ClientBuilder::new().build().unwrap();
        let err = client
            .languages()
            .all(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }
}
