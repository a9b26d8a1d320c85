//! Request and response types for the TheTVDB v2 API.
//!
//! These types mirror the remote JSON contract. Fields the API may omit or
//! send as `null` are `Option` or defaulted.

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Standard response envelope: every payload arrives under `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvdbResponse<T> {
    /// The payload.
    pub data: T,
    /// Pagination links, present on paged endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

/// Pagination links for paged endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub first: Option<u32>,
    pub last: Option<u32>,
    pub next: Option<u32>,
    pub prev: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub apikey: String,
}

/// Token returned by `/login` and `/refresh_token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Series
// ─────────────────────────────────────────────────────────────────────────────

/// A single search hit from `/search/series`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesSearchResult {
    pub id: u32,
    pub series_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    pub banner: Option<String>,
    pub first_aired: Option<String>,
    pub network: Option<String>,
    pub overview: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
}

/// Full series record from `/series/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Series {
    pub id: u32,
    pub series_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    pub banner: Option<String>,
    pub series_id: Option<String>,
    pub status: Option<String>,
    pub first_aired: Option<String>,
    pub network: Option<String>,
    pub network_id: Option<String>,
    pub runtime: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub genre: Vec<String>,
    pub overview: Option<String>,
    pub last_updated: Option<i64>,
    pub airs_day_of_week: Option<String>,
    pub airs_time: Option<String>,
    pub rating: Option<String>,
    pub imdb_id: Option<String>,
    pub zap2it_id: Option<String>,
    pub added: Option<String>,
    pub site_rating: Option<f64>,
    pub site_rating_count: Option<u32>,
}

/// Aired/DVD season and episode counts from `/series/{id}/episodes/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EpisodesSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub aired_seasons: Vec<String>,
    pub aired_episodes: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dvd_seasons: Vec<String>,
    pub dvd_episodes: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Episodes
// ─────────────────────────────────────────────────────────────────────────────

/// Episode record, returned by `/episodes/{id}` and the paged episode queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub id: u32,
    pub series_id: Option<u32>,
    pub aired_season: Option<i32>,
    pub aired_episode_number: Option<i32>,
    pub absolute_number: Option<i32>,
    pub dvd_season: Option<i32>,
    pub dvd_episode_number: Option<f64>,
    pub episode_name: Option<String>,
    pub first_aired: Option<String>,
    pub overview: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub guest_stars: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub directors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub writers: Vec<String>,
    pub filename: Option<String>,
    pub imdb_id: Option<String>,
    pub last_updated: Option<i64>,
    pub site_rating: Option<f64>,
    pub site_rating_count: Option<u32>,
}

/// Filters for `/series/{id}/episodes/query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aired_season: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aired_episode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dvd_season: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dvd_episode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl EpisodeQuery {
    /// Query all episodes aired in one season.
    pub fn aired_season(season: i32) -> Self {
        Self {
            aired_season: Some(season),
            ..Default::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Actors & images
// ─────────────────────────────────────────────────────────────────────────────

/// Cast member from `/series/{id}/actors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Actor {
    pub id: u32,
    pub series_id: Option<u32>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub sort_order: Option<i32>,
    pub image: Option<String>,
    pub image_author: Option<u32>,
    pub image_added: Option<String>,
    pub last_updated: Option<String>,
}

/// Artwork entry from `/series/{id}/images/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    pub id: u32,
    pub key_type: Option<String>,
    pub sub_key: Option<String>,
    pub file_name: Option<String>,
    pub resolution: Option<String>,
    pub ratings_info: Option<RatingsInfo>,
    pub thumbnail: Option<String>,
    pub language_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
}

/// Filters for `/series/{id}/images/query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesQuery {
    /// Artwork kind: `fanart`, `poster`, `season`, `seasonwide`, `series`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
}

impl ImagesQuery {
    /// Query images of one kind.
    pub fn key_type(key_type: impl Into<String>) -> Self {
        Self {
            key_type: Some(key_type.into()),
            ..Default::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Languages
// ─────────────────────────────────────────────────────────────────────────────

/// Language supported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub id: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub abbreviation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub english_name: String,
}

/// Deserialize `null` as the type's default; `#[serde(default)]` only covers
/// missing keys.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
