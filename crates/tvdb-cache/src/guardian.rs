//! Session lifecycle for the remote client.
//!
//! The guardian authenticates lazily on first use, refreshes the token once
//! it reaches the configured age, and falls back to a full
//! re-authentication when the refresh is rejected.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::GateConfig;

// ============================================================================
// SessionClient Trait
// ============================================================================

/// Authentication capability of a remote client.
///
/// Implementations hold their token internally; clones share it, so the
/// guardian can hand out clones as client handles.
#[async_trait]
pub trait SessionClient: Clone + Send + Sync + 'static {
    /// Error returned by the remote client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Obtain a new token from an API key.
    async fn authenticate(&self, api_key: &str) -> Result<(), Self::Error>;

    /// Renew the current token.
    async fn refresh_token(&self) -> Result<(), Self::Error>;

    /// Set the language applied to subsequent lookups.
    fn set_accepted_language(&self, language: &str);
}

#[async_trait]
impl SessionClient for tvdb_client::TvdbClient {
    type Error = tvdb_client::Error;

    async fn authenticate(&self, api_key: &str) -> Result<(), Self::Error> {
        tvdb_client::TvdbClient::authenticate(self, api_key).await
    }

    async fn refresh_token(&self) -> Result<(), Self::Error> {
        tvdb_client::TvdbClient::refresh_token(self).await
    }

    fn set_accepted_language(&self, language: &str) {
        tvdb_client::TvdbClient::set_accepted_language(self, language)
    }
}

// ============================================================================
// TokenGuardian
// ============================================================================

/// An authenticated session.
#[derive(Debug, Clone, Copy)]
struct Session {
    issued_at: Instant,
}

impl Session {
    fn start() -> Self {
        Self {
            issued_at: Instant::now(),
        }
    }

    fn age(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

/// Owns the one authenticated session of a remote client.
///
/// [`acquire_client`](Self::acquire_client) is the only way to obtain the
/// client. The first call authenticates; later calls refresh the token once
/// its age reaches the refresh threshold. Creation and renewal run under the
/// session write lock with a re-check, so racing callers trigger a single
/// authentication.
pub struct TokenGuardian<C: SessionClient> {
    client: C,
    api_key: String,
    refresh_threshold: Duration,
    language: String,
    session: RwLock<Option<Session>>,
}

impl<C: SessionClient> std::fmt::Debug for TokenGuardian<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGuardian")
            .field("api_key", &"<redacted>")
            .field("refresh_threshold", &self.refresh_threshold)
            .field("language", &self.language)
            .finish()
    }
}

impl<C: SessionClient> TokenGuardian<C> {
    /// Create a guardian. No remote call is made until the first acquisition.
    pub fn new(client: C, api_key: impl Into<String>, config: &GateConfig) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            refresh_threshold: config.refresh_threshold,
            language: config.language.clone(),
            session: RwLock::new(None),
        }
    }

    /// Return a client with a valid session.
    ///
    /// Authenticates if no session exists. If the session is at least
    /// `refresh_threshold` old the token is refreshed, and a failed refresh is
    /// followed by exactly one re-authentication. When that also fails its
    /// error is returned and the old session is kept so the next call tries
    /// again. A failed first authentication leaves no session behind.
    pub async fn acquire_client(&self) -> Result<C, C::Error> {
        {
            let session = self.session.read().await;
            if let Some(current) = *session
                && !self.is_stale(&current)
            {
                return Ok(self.hand_out());
            }
        }

        let mut session = self.session.write().await;
        let current = *session;
        match current {
            None => {
                debug!("No session, authenticating");
                self.client.authenticate(&self.api_key).await?;
                *session = Some(Session::start());
                info!("Session established");
            }
            Some(current) if self.is_stale(&current) => {
                debug!(age_secs = current.age().as_secs(), "Session stale, renewing");
                self.renew().await?;
                *session = Some(Session::start());
            }
            Some(_) => trace!("Session renewed by a concurrent caller"),
        }
        drop(session);

        Ok(self.hand_out())
    }

    /// Age of the current session, if one exists.
    pub async fn token_age(&self) -> Option<Duration> {
        self.session.read().await.map(|s| s.age())
    }

    /// Whether a session has been established.
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Forget the session; the next acquisition authenticates from scratch.
    pub async fn invalidate(&self) {
        let mut session = self.session.write().await;
        if session.take().is_some() {
            debug!("Session invalidated");
        }
    }

    fn is_stale(&self, session: &Session) -> bool {
        session.age() >= self.refresh_threshold
    }

    async fn renew(&self) -> Result<(), C::Error> {
        match self.client.refresh_token().await {
            Ok(()) => {
                debug!("Token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, re-authenticating");
                self.client.authenticate(&self.api_key).await?;
                info!("Session re-established");
                Ok(())
            }
        }
    }

    fn hand_out(&self) -> C {
        self.client.set_accepted_language(&self.language);
        self.client.clone()
    }
}
