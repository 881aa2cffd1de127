/// HTTP client for the similarity recommendation backend
///
/// The backend ranks movies by TF-IDF similarity over genre and overview
/// text. That ranking is opaque here; only names cross the wire.
use crate::{
    error::AppResult,
    models::{MovieListResponse, RecommendationResponse},
    services::providers::{decode_response, RecommenderBackend},
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct HttpRecommenderBackend {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommenderBackend {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RecommenderBackend for HttpRecommenderBackend {
    async fn list_movies(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/movies", self.api_url);
        let response = self.http_client.get(&url).send().await?;
        let list: MovieListResponse = decode_response(self.name(), response).await?;

        tracing::info!(
            movies = list.movies.len(),
            backend = self.name(),
            "Movie list fetched"
        );

        Ok(list.movies)
    }

    async fn recommend(&self, title: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/recommend", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("movie", title)])
            .send()
            .await?;
        let recs: RecommendationResponse = decode_response(self.name(), response).await?;

        tracing::info!(
            movie = %title,
            recommendations = recs.recommendations.len(),
            backend = self.name(),
            "Recommendations fetched"
        );

        Ok(recs.recommendations)
    }

    fn name(&self) -> &'static str {
        "recommender"
    }
}
