use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Movie, MovieId, TmdbMovie, NOT_AVAILABLE},
    services::providers::MetadataProvider,
};
use futures::future::join_all;
use reqwest::Url;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::OnceCell;

pub const DEFAULT_GENRE: &str = "Drama";
const SEARCH_QUALIFIER: &str = "hindi";
const DEFAULT_OVERVIEW: &str = "A Bollywood masterpiece.";

const SYNTHETIC_YEAR: &str = "2023";
const SYNTHETIC_RATING: &str = "7.5";
const SYNTHETIC_OVERVIEW: &str = "A captivating Bollywood film.";
const SYNTHETIC_VOTE_COUNT: u64 = 1000;

/// Genre ID → genre name
pub type GenreMap = HashMap<u32, String>;

/// Outcome of enriching a single movie name
#[derive(Debug)]
pub enum Enrichment {
    /// TMDB matched the name
    Found(Movie),
    /// TMDB had no match; the movie is a synthetic placeholder
    NotFound(Movie),
    /// The search could not be completed
    Failed(AppError),
}

impl Enrichment {
    /// The displayable record, if any. Failures are absent.
    pub fn into_movie(self) -> Option<Movie> {
        match self {
            Enrichment::Found(movie) | Enrichment::NotFound(movie) => Some(movie),
            Enrichment::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Enrichment::Failed(_))
    }
}

/// Builds poster, backdrop and placeholder image URLs
#[derive(Debug, Clone)]
pub struct ImageUrls {
    poster_base: String,
    backdrop_base: String,
    placeholder_base: String,
}

impl ImageUrls {
    pub fn new(poster_base: String, backdrop_base: String, placeholder_base: String) -> Self {
        Self {
            poster_base,
            backdrop_base,
            placeholder_base,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.poster_base_url.clone(),
            config.backdrop_base_url.clone(),
            config.placeholder_image_url.clone(),
        )
    }

    /// Poster URL, falling back to a placeholder image captioned with `name`
    pub fn poster(&self, poster_path: Option<&str>, name: &str) -> String {
        match poster_path.filter(|p| !p.is_empty()) {
            Some(path) => format!("{}{}", self.poster_base, path),
            None => self.placeholder(name),
        }
    }

    pub fn backdrop(&self, backdrop_path: Option<&str>) -> Option<String> {
        backdrop_path
            .filter(|p| !p.is_empty())
            .map(|path| format!("{}{}", self.backdrop_base, path))
    }

    pub fn placeholder(&self, name: &str) -> String {
        Url::parse_with_params(&self.placeholder_base, &[("text", name)])
            .map(String::from)
            .unwrap_or_else(|_| self.placeholder_base.clone())
    }
}

/// Turns bare movie names into display-ready [`Movie`] records via TMDB
///
/// The genre table is fetched at most once per enricher (and therefore once
/// per process, since the enricher is shared). A failed genre fetch is not
/// cached, so the next enrichment tries again.
#[derive(Clone)]
pub struct MetadataEnricher {
    provider: Arc<dyn MetadataProvider>,
    images: ImageUrls,
    genres: Arc<OnceCell<GenreMap>>,
}

impl MetadataEnricher {
    pub fn new(provider: Arc<dyn MetadataProvider>, images: ImageUrls) -> Self {
        Self {
            provider,
            images,
            genres: Arc::new(OnceCell::new()),
        }
    }

    /// Enriches one movie name
    ///
    /// Takes TMDB's first-ranked candidate as-is. When the genre table cannot
    /// be loaded the TMDB data is still kept and the genre defaults to Drama.
    pub async fn enrich(&self, name: &str) -> Enrichment {
        if name.trim().is_empty() {
            return Enrichment::Failed(AppError::InvalidInput(
                "Movie name cannot be empty".to_string(),
            ));
        }

        let query = search_query(name);
        let candidates = match self.provider.search_movie(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    movie = %name,
                    provider = self.provider.name(),
                    error = %e,
                    "Enrichment failed"
                );
                return Enrichment::Failed(e);
            }
        };

        let Some(candidate) = candidates.into_iter().next() else {
            tracing::debug!(movie = %name, "No metadata match, using placeholder record");
            return Enrichment::NotFound(self.synthetic(name));
        };

        let genre = match self.genre_map().await {
            Ok(genres) => resolve_genres(&candidate.genre_ids, genres),
            Err(e) => {
                tracing::warn!(
                    movie = %name,
                    error = %e,
                    "Genre lookup failed, keeping metadata with default genre"
                );
                DEFAULT_GENRE.to_string()
            }
        };

        Enrichment::Found(self.provider_backed(name, candidate, genre))
    }

    /// Enriches every name concurrently
    ///
    /// Output keeps input order. Names that fail to enrich are dropped.
    pub async fn enrich_batch(&self, names: &[String]) -> Vec<Movie> {
        let results = join_all(names.iter().map(|name| self.enrich(name))).await;

        let failed = results.iter().filter(|r| r.is_failed()).count();
        let movies: Vec<Movie> = results
            .into_iter()
            .filter_map(Enrichment::into_movie)
            .collect();

        tracing::debug!(
            requested = names.len(),
            synthetic = movies.iter().filter(|m| m.is_synthetic()).count(),
            "Batch enriched"
        );

        if failed > 0 {
            tracing::warn!(
                success_count = movies.len(),
                error_count = failed,
                "Partial enrichment failure"
            );
        }

        movies
    }

    async fn genre_map(&self) -> AppResult<&GenreMap> {
        self.genres
            .get_or_try_init(|| async {
                let genres = self.provider.genre_list().await?;
                Ok::<_, AppError>(genres.into_iter().map(|g| (g.id, g.name)).collect())
            })
            .await
    }

    fn provider_backed(&self, name: &str, candidate: TmdbMovie, genre: String) -> Movie {
        let year = candidate
            .release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .and_then(|d| d.split('-').next())
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        Movie {
            id: MovieId::Tmdb(candidate.id),
            title: name.to_string(),
            original_title: candidate.title.unwrap_or_else(|| name.to_string()),
            poster: self.images.poster(candidate.poster_path.as_deref(), name),
            backdrop: self.images.backdrop(candidate.backdrop_path.as_deref()),
            year,
            genre,
            rating: format_rating(candidate.vote_average),
            overview: candidate
                .overview
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| DEFAULT_OVERVIEW.to_string()),
            vote_count: candidate.vote_count.unwrap_or(0),
        }
    }

    fn synthetic(&self, name: &str) -> Movie {
        Movie {
            id: MovieId::synthetic(),
            title: name.to_string(),
            original_title: name.to_string(),
            poster: self.images.placeholder(name),
            backdrop: None,
            year: SYNTHETIC_YEAR.to_string(),
            genre: DEFAULT_GENRE.to_string(),
            rating: SYNTHETIC_RATING.to_string(),
            overview: SYNTHETIC_OVERVIEW.to_string(),
            vote_count: SYNTHETIC_VOTE_COUNT,
        }
    }
}

/// Appends the locale qualifier unless the name already carries it
fn search_query(name: &str) -> String {
    if name.contains(SEARCH_QUALIFIER) {
        name.to_string()
    } else {
        format!("{} {}", name, SEARCH_QUALIFIER)
    }
}

fn resolve_genres(genre_ids: &[u32], genres: &GenreMap) -> String {
    let names: Vec<&str> = genre_ids
        .iter()
        .filter_map(|id| genres.get(id).map(String::as_str))
        .collect();

    if names.is_empty() {
        DEFAULT_GENRE.to_string()
    } else {
        names.join(", ")
    }
}

/// One decimal place of the exact stored value. Zero or missing is "N/A".
///
/// Exact ties only occur at odd quarters (7.25, 7.75) and round up; every
/// other value is formatted from its exact binary expansion, so 0.15 is "0.1".
fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(v) if v.is_finite() && v != 0.0 => {
            let v = v.clamp(0.0, 10.0);
            let quarters = v * 4.0;
            if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
                format!("{:.1}", (v * 10.0).ceil() / 10.0)
            } else {
                format!("{:.1}", v)
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}
