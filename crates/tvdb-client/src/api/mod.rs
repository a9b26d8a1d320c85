//! API endpoint implementations.

mod episodes;
mod languages;
mod search;
mod series;

pub use episodes::EpisodesApi;
pub use languages::LanguagesApi;
pub use search::SearchApi;
pub use series::SeriesApi;
