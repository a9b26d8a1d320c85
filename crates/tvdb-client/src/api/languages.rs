//! Languages API.

use tokio_util::sync::CancellationToken;

use crate::client::TvdbClient;
use crate::error::Result;
use crate::types::{Language, TvdbResponse};

/// Languages API client.
pub struct LanguagesApi {
    client: TvdbClient,
}

impl LanguagesApi {
    pub(crate) fn new(client: TvdbClient) -> Self {
        Self { client }
    }

    /// List every language the API can translate records into.
    pub async fn all(&self, cancel: &CancellationToken) -> Result<TvdbResponse<Vec<Language>>> {
        self.client.get("languages", cancel).await
    }
}
