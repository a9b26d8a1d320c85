//! Series API.

use tokio_util::sync::CancellationToken;

use crate::client::TvdbClient;
use crate::error::Result;
use crate::types::{
    Actor, EpisodeQuery, EpisodeRecord, EpisodesSummary, Image, ImagesQuery, Series,
    TvdbResponse,
};

/// Series API client.
pub struct SeriesApi {
    client: TvdbClient,
}

impl SeriesApi {
    pub(crate) fn new(client: TvdbClient) -> Self {
        Self { client }
    }

    /// Get a series by TheTVDB id.
    pub async fn get(&self, id: u32, cancel: &CancellationToken) -> Result<TvdbResponse<Series>> {
        self.client.get(&format!("series/{}", id), cancel).await
    }

    /// Get the cast of a series.
    pub async fn actors(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<Actor>>> {
        self.client.get(&format!("series/{}/actors", id), cancel).await
    }

    /// Query artwork for a series.
    pub async fn images(
        &self,
        id: u32,
        query: &ImagesQuery,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<Image>>> {
        self.client
            .get_with_query(&format!("series/{}/images/query", id), query, cancel)
            .await
    }

    /// Season and episode counts of a series.
    pub async fn episodes_summary(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<EpisodesSummary>> {
        self.client
            .get(&format!("series/{}/episodes/summary", id), cancel)
            .await
    }

    /// One page of episodes matching `query`. Pages start at 1.
    pub async fn episodes(
        &self,
        id: u32,
        page: u32,
        query: &EpisodeQuery,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<EpisodeRecord>>> {
        let params = EpisodePageParams { page, query };
        self.client
            .get_with_query(&format!("series/{}/episodes/query", id), &params, cancel)
            .await
    }
}

#[derive(serde::Serialize)]
struct EpisodePageParams<'a> {
    page: u32,
    #[serde(flatten)]
    query: &'a EpisodeQuery,
}
