//! Series search API.

use tokio_util::sync::CancellationToken;

use crate::client::TvdbClient;
use crate::error::Result;
use crate::types::{SeriesSearchResult, TvdbResponse};

/// Search API client.
pub struct SearchApi {
    client: TvdbClient,
}

impl SearchApi {
    pub(crate) fn new(client: TvdbClient) -> Self {
        Self { client }
    }

    /// Search series by (partial) name.
    pub async fn series_by_name(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        self.search("name", name, cancel).await
    }

    /// Search series by IMDb id (`tt0944947`).
    pub async fn series_by_imdb_id(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        self.search("imdbId", imdb_id, cancel).await
    }

    /// Search series by Zap2It id.
    pub async fn series_by_zap2it_id(
        &self,
        zap2it_id: &str,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        self.search("zap2itId", zap2it_id, cancel).await
    }

    async fn search(
        &self,
        field: &str,
        value: &str,
        cancel: &CancellationToken,
    ) -> Result<TvdbResponse<Vec<SeriesSearchResult>>> {
        self.client
            .get_with_query("search/series", &[(field, value)], cancel)
            .await
    }
}
