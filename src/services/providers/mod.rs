/// External collaborators of the enrichment pipeline
///
/// Two HTTP services sit behind traits here: the TMDB metadata provider and
/// the recommendation backend. Everything above this layer talks to them
/// only through these traits so the pipeline can be exercised without a
/// network.
use crate::{
    error::{AppError, AppResult},
    models::{TmdbGenre, TmdbMovie},
};
use serde::de::DeserializeOwned;

pub mod recommender;
pub mod tmdb;

pub use recommender::HttpRecommenderBackend;
pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by free-text query
    ///
    /// Returns candidates in the provider's own ranking order.
    async fn search_movie(&self, query: &str) -> AppResult<Vec<TmdbMovie>>;

    /// Fetch the full genre id → name list
    async fn genre_list(&self) -> AppResult<Vec<TmdbGenre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for the similarity recommendation backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommenderBackend: Send + Sync {
    /// Every movie name the backend knows about
    async fn list_movies(&self) -> AppResult<Vec<String>>;

    /// Names of movies similar to `title`
    async fn recommend(&self, title: &str) -> AppResult<Vec<String>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Checks the status and decodes a JSON body
///
/// Non-success statuses become `ExternalApi`, bodies that do not match `T`
/// become `Decode`.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalApi(format!(
            "{} returned status {}: {}",
            provider, status, body
        )));
    }

    let response_text = response.text().await?;
    serde_json::from_str(&response_text).map_err(|e| {
        tracing::error!(
            error = %e,
            provider = provider,
            response = %response_text,
            "Failed to deserialize response"
        );
        AppError::Decode(format!("Failed to parse {} response: {}", provider, e))
    })
}
