//! Episodes API.

use tokio_util::sync::CancellationToken;

use crate::client::TvdbClient;
use crate::error::Result;
use crate::types::{EpisodeRecord, TvdbResponse};

/// Episodes API client.
pub struct EpisodesApi {
    client: TvdbClient,
}

impl EpisodesApi {
    pub(crate) fn new(client: TvdbClient) -> Self {
        Self { client }
    }

    /// Get a single episode by TheTVDB id.
    pub async fn get(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<EpisodeRecord>> {
        self.client.get(&format!("episodes/{}", id), cancel).await
    }
}
