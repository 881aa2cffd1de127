use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Sentinel used for a missing year or rating
pub const NOT_AVAILABLE: &str = "N/A";

/// Identifier for a movie: TMDB-issued, or generated locally for synthetic records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieId {
    /// TMDB movie ID (e.g., 20453 for "3 Idiots")
    Tmdb(u64),
    /// Placeholder ID for a record built from defaults
    Synthetic(Uuid),
}

impl MovieId {
    pub fn synthetic() -> Self {
        MovieId::Synthetic(Uuid::new_v4())
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieId::Tmdb(id) => write!(f, "{}", id),
            MovieId::Synthetic(id) => write!(f, "{}", id),
        }
    }
}

/// A fully-populated movie record ready for display
///
/// `title` is always the name the movie was requested under and is the key
/// used for search, selection and fallback matching. `original_title` is
/// whatever TMDB calls it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub poster: String,
    pub backdrop: Option<String>,
    pub year: String,
    pub genre: String,
    pub rating: String,
    pub overview: String,
    pub vote_count: u64,
}

impl Movie {
    /// True when the record was built from defaults rather than TMDB data
    pub fn is_synthetic(&self) -> bool {
        matches!(self.id, MovieId::Synthetic(_))
    }

    /// Numeric rating, or `None` for the sentinel
    #[cfg(test)]
    pub fn rating_value(&self) -> Option<f64> {
        self.rating.parse().ok()
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// One candidate from a TMDB movie search
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_count: Option<u64>,
}

/// Response from GET /genre/movie/list
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// Recommendation Backend Types
// ============================================================================

/// Response from GET /movies
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    pub movies: Vec<String>,
}

/// Response from GET /recommend
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub recommendations: Vec<String>,
}
