use crate::{
    models::Movie,
    services::{enrichment::MetadataEnricher, providers::RecommenderBackend},
};
use serde::Serialize;
use std::{
    fmt::Display,
    sync::{Arc, Mutex, PoisonError},
};
use tokio_util::sync::CancellationToken;

/// Most catalog movies offered when the backend is unreachable
pub const FALLBACK_LIMIT: usize = 6;

/// How an orchestration invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Backend recommendations, enriched
    Success,
    /// Backend failed; same-genre catalog movies instead
    Fallback,
    /// Backend answered with no recommendations
    Empty,
}

/// User-visible reason accompanying a non-success outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationError {
    Unavailable,
    NoneFound,
}

impl RecommendationError {
    pub fn message(&self) -> &'static str {
        match self {
            RecommendationError::Unavailable => {
                "Unable to fetch recommendations. Please try another movie."
            }
            RecommendationError::NoneFound => "No recommendations found for this movie.",
        }
    }
}

impl Display for RecommendationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of one orchestration invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub outcome: Outcome,
    pub items: Vec<Movie>,
    pub error: Option<RecommendationError>,
}

/// Handle for one selection-to-recommendations cycle
///
/// Cancelled as soon as a newer invocation begins.
#[derive(Debug, Clone)]
pub struct Invocation {
    id: u64,
    token: CancellationToken,
}

impl Invocation {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Drives select → fetch recommendations → enrich, with catalog fallback
pub struct RecommendationOrchestrator {
    backend: Arc<dyn RecommenderBackend>,
    enricher: MetadataEnricher,
    current: Mutex<Current>,
}

/// Latest invocation id and its token; both change under one lock
#[derive(Default)]
struct Current {
    last_id: u64,
    token: Option<CancellationToken>,
}

impl RecommendationOrchestrator {
    pub fn new(backend: Arc<dyn RecommenderBackend>, enricher: MetadataEnricher) -> Self {
        Self {
            backend,
            enricher,
            current: Mutex::new(Current::default()),
        }
    }

    /// Starts a new invocation, cancelling the one in flight (if any)
    ///
    /// Ids increase strictly in the order invocations begin, so the latest
    /// id always belongs to the only uncancelled token.
    pub fn begin(&self) -> Invocation {
        let token = CancellationToken::new();

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.last_id += 1;
        if let Some(previous) = current.token.replace(token.clone()) {
            previous.cancel();
        }

        Invocation {
            id: current.last_id,
            token,
        }
    }

    /// Fetches recommendations for `movie`
    ///
    /// Returns `None` when the invocation was superseded before it finished;
    /// in-flight requests are dropped and their results never surface.
    pub async fn recommend(
        &self,
        invocation: &Invocation,
        movie: &Movie,
        catalog: &[Movie],
    ) -> Option<Recommendation> {
        tokio::select! {
            biased;
            _ = invocation.token.cancelled() => {
                tracing::debug!(
                    invocation = invocation.id,
                    movie = %movie.title,
                    "Recommendation superseded, discarding"
                );
                None
            }
            recommendation = self.run(movie, catalog) => Some(recommendation),
        }
    }

    async fn run(&self, movie: &Movie, catalog: &[Movie]) -> Recommendation {
        let names = match self.backend.recommend(&movie.title).await {
            Ok(names) => names,
            Err(e) => {
                let items = genre_fallback(movie, catalog);
                tracing::warn!(
                    movie = %movie.title,
                    backend = self.backend.name(),
                    error = %e,
                    fallback_count = items.len(),
                    "Recommendations unavailable, using same-genre fallback"
                );
                return Recommendation {
                    outcome: Outcome::Fallback,
                    items,
                    error: Some(RecommendationError::Unavailable),
                };
            }
        };

        if names.is_empty() {
            tracing::info!(movie = %movie.title, "Backend returned no recommendations");
            return Recommendation {
                outcome: Outcome::Empty,
                items: Vec::new(),
                error: Some(RecommendationError::NoneFound),
            };
        }

        let items = self.enricher.enrich_batch(&names).await;

        tracing::info!(
            movie = %movie.title,
            requested = names.len(),
            enriched = items.len(),
            "Recommendations ready"
        );

        Recommendation {
            outcome: Outcome::Success,
            items,
            error: None,
        }
    }
}

/// Catalog movies sharing `movie`'s genre string, excluding `movie` itself
pub fn genre_fallback(movie: &Movie, catalog: &[Movie]) -> Vec<Movie> {
    catalog
        .iter()
        .filter(|m| m.id != movie.id && m.genre == movie.genre)
        .take(FALLBACK_LIMIT)
        .cloned()
        .collect()
}
