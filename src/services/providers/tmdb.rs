/// TMDB (The Movie Database) metadata provider
///
/// API Flow:
/// 1. Search: /search/movie → ranked candidates with genre IDs
/// 2. Genres: /genre/movie/list → genre ID to name table
use crate::{
    error::AppResult,
    models::{TmdbGenre, TmdbGenreList, TmdbMovie, TmdbSearchResponse},
    services::providers::{decode_response, MetadataProvider},
};
use reqwest::Client as HttpClient;

const SEARCH_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movie(&self, query: &str) -> AppResult<Vec<TmdbMovie>> {
        let url = format!("{}/search/movie", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("language", SEARCH_LANGUAGE),
            ])
            .send()
            .await?;

        let search: TmdbSearchResponse = decode_response(self.name(), response).await?;

        tracing::debug!(
            query = %query,
            results = search.results.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(search.results)
    }

    async fn genre_list(&self) -> AppResult<Vec<TmdbGenre>> {
        let url = format!("{}/genre/movie/list", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let list: TmdbGenreList = decode_response(self.name(), response).await?;

        tracing::info!(
            genres = list.genres.len(),
            provider = self.name(),
            "Genre list fetched"
        );

        Ok(list.genres)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
