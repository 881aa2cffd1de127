use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::Movie,
    services::{
        catalog::CatalogLoader,
        enrichment::{ImageUrls, MetadataEnricher},
        providers::{HttpRecommenderBackend, MetadataProvider, RecommenderBackend, TmdbProvider},
        recommendations::{Outcome, Recommendation, RecommendationError, RecommendationOrchestrator},
    },
};

/// Where the recommendation panel is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Fallback,
    Empty,
}

impl From<Outcome> for Phase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Phase::Success,
            Outcome::Fallback => Phase::Fallback,
            Outcome::Empty => Phase::Empty,
        }
    }
}

/// Discrete changes to the view
#[derive(Debug, Clone)]
pub enum ViewEvent {
    CatalogLoaded(Vec<Movie>),
    SelectionMade {
        invocation: u64,
        movie: Movie,
    },
    RecommendationsReady {
        invocation: u64,
        items: Vec<Movie>,
    },
    RecommendationsFailed {
        invocation: u64,
        outcome: Outcome,
        items: Vec<Movie>,
        error: RecommendationError,
    },
}

impl ViewEvent {
    /// Event reporting the result of `invocation`
    pub fn from_recommendation(invocation: u64, recommendation: Recommendation) -> Self {
        match recommendation.error {
            None => ViewEvent::RecommendationsReady {
                invocation,
                items: recommendation.items,
            },
            Some(error) => ViewEvent::RecommendationsFailed {
                invocation,
                outcome: recommendation.outcome,
                items: recommendation.items,
                error,
            },
        }
    }
}

/// Immutable snapshot of everything the display layer shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub catalog: Vec<Movie>,
    pub catalog_loaded: bool,
    pub selected: Option<Movie>,
    pub selection_id: Option<u64>,
    pub phase: Phase,
    pub recommendations: Vec<Movie>,
    pub error: Option<String>,
}

impl ViewState {
    /// Returns the snapshot that follows `event`
    ///
    /// Recommendation results for anything but the latest selection are
    /// ignored, as is a selection older than the current one.
    pub fn apply(&self, event: ViewEvent) -> ViewState {
        match event {
            ViewEvent::CatalogLoaded(catalog) => ViewState {
                catalog,
                catalog_loaded: true,
                ..self.clone()
            },
            ViewEvent::SelectionMade { invocation, movie } => {
                if self.selection_id.is_some_and(|current| invocation < current) {
                    tracing::debug!(
                        invocation,
                        selection_id = ?self.selection_id,
                        "Ignoring selection older than the current one"
                    );
                    return self.clone();
                }
                ViewState {
                    selected: Some(movie),
                    selection_id: Some(invocation),
                    phase: Phase::Loading,
                    recommendations: Vec::new(),
                    error: None,
                    ..self.clone()
                }
            }
            ViewEvent::RecommendationsReady { invocation, items } => {
                if !self.is_current(invocation) {
                    return self.clone();
                }
                ViewState {
                    phase: Phase::Success,
                    recommendations: items,
                    error: None,
                    ..self.clone()
                }
            }
            ViewEvent::RecommendationsFailed {
                invocation,
                outcome,
                items,
                error,
            } => {
                if !self.is_current(invocation) {
                    return self.clone();
                }
                ViewState {
                    phase: outcome.into(),
                    recommendations: items,
                    error: Some(error.message().to_string()),
                    ..self.clone()
                }
            }
        }
    }

    fn is_current(&self, invocation: u64) -> bool {
        let current = self.selection_id == Some(invocation);
        if !current {
            tracing::debug!(
                invocation,
                selection_id = ?self.selection_id,
                "Ignoring stale recommendation result"
            );
        }
        current
    }

    /// Looks a movie up by title in the catalog, then in the recommendations
    pub fn find_movie(&self, title: &str) -> Option<&Movie> {
        self.catalog
            .iter()
            .chain(self.recommendations.iter())
            .find(|m| m.title == title)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    view: Arc<RwLock<Arc<ViewState>>>,
    catalog_loader: CatalogLoader,
    orchestrator: Arc<RecommendationOrchestrator>,
}

impl AppState {
    /// Wires the pipeline around the given collaborators
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        backend: Arc<dyn RecommenderBackend>,
        images: ImageUrls,
    ) -> Self {
        let enricher = MetadataEnricher::new(metadata, images);
        Self {
            view: Arc::new(RwLock::new(Arc::new(ViewState::default()))),
            catalog_loader: CatalogLoader::new(backend.clone(), enricher.clone()),
            orchestrator: Arc::new(RecommendationOrchestrator::new(backend, enricher)),
        }
    }

    /// Builds HTTP-backed collaborators from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let metadata = TmdbProvider::new(
            http_client.clone(),
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        );
        let backend = HttpRecommenderBackend::new(http_client, config.backend_url.clone());

        Ok(Self::new(
            Arc::new(metadata),
            Arc::new(backend),
            ImageUrls::from_config(config),
        ))
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<ViewState> {
        self.view.read().await.clone()
    }

    /// Applies `event` and returns the new snapshot
    pub async fn dispatch(&self, event: ViewEvent) -> Arc<ViewState> {
        let mut view = self.view.write().await;
        let next = Arc::new(view.apply(event));
        *view = next.clone();
        next
    }

    /// Runs the catalog loader and publishes the result
    pub async fn load_catalog(&self) -> Arc<ViewState> {
        let catalog = self.catalog_loader.load().await;
        self.dispatch(ViewEvent::CatalogLoaded(catalog)).await
    }

    /// Selects the movie titled `title` and fetches its recommendations
    ///
    /// If a newer selection supersedes this one while it is loading, the
    /// snapshot is returned without this selection's result.
    pub async fn select(&self, title: &str) -> AppResult<Arc<ViewState>> {
        let snapshot = self.snapshot().await;
        let movie = snapshot
            .find_movie(title)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' is not in the catalog", title)))?;

        // Invocation ids and SelectionMade must reach the view in the same order
        let invocation = {
            let mut view = self.view.write().await;
            let invocation = self.orchestrator.begin();
            let next = view.apply(ViewEvent::SelectionMade {
                invocation: invocation.id(),
                movie: movie.clone(),
            });
            *view = Arc::new(next);
            invocation
        };

        tracing::info!(
            invocation = invocation.id(),
            movie = %movie.title,
            "Selection made"
        );

        match self
            .orchestrator
            .recommend(&invocation, &movie, &snapshot.catalog)
            .await
        {
            Some(recommendation) if !invocation.is_cancelled() => Ok(self
                .dispatch(ViewEvent::from_recommendation(
                    invocation.id(),
                    recommendation,
                ))
                .await),
            _ => {
                tracing::debug!(
                    invocation = invocation.id(),
                    movie = %movie.title,
                    "Selection superseded before its recommendations were published"
                );
                Ok(self.snapshot().await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieId;
    use tokio::sync::Notify;

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id: MovieId::Tmdb(id),
            title: title.to_string(),
            original_title: title.to_string(),
            poster: format!("https://image.tmdb.org/t/p/w500/{}.jpg", id),
            backdrop: None,
            year: "2015".to_string(),
            genre: "Drama".to_string(),
            rating: "8.0".to_string(),
            overview: String::new(),
            vote_count: 1,
        }
    }

    fn selected(state: &ViewState, invocation: u64, title: &str) -> ViewState {
        state.apply(ViewEvent::SelectionMade {
            invocation,
            movie: movie(1, title),
        })
    }

    #[test]
    fn test_initial_state_is_idle_and_empty() {
        let state = ViewState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.catalog.is_empty());
        assert!(!state.catalog_loaded);
    }

    #[test]
    fn test_catalog_loaded() {
        let state =
            ViewState::default().apply(ViewEvent::CatalogLoaded(vec![movie(1, "PK"), movie(2, "War")]));
        assert!(state.catalog_loaded);
        assert_eq!(state.catalog.len(), 2);
        assert_eq!(state.find_movie("War").map(|m| m.id.clone()), Some(MovieId::Tmdb(2)));
        assert!(state.find_movie("Sholay").is_none());
    }

    #[test]
    fn test_selection_enters_loading_and_clears_previous_result() {
        let state = selected(&ViewState::default(), 1, "PK");
        let state = state.apply(ViewEvent::RecommendationsFailed {
            invocation: 1,
            outcome: Outcome::Empty,
            items: vec![],
            error: RecommendationError::NoneFound,
        });
        let state = selected(&state, 2, "War");

        assert_eq!(state.phase, Phase::Loading);
        assert_eq!(state.selection_id, Some(2));
        assert_eq!(state.error, None);
        assert!(state.recommendations.is_empty());
    }

    #[test]
    fn test_ready_sets_success() {
        let state = selected(&ViewState::default(), 1, "PK").apply(
            ViewEvent::RecommendationsReady {
                invocation: 1,
                items: vec![movie(5, "3 Idiots")],
            },
        );
        assert_eq!(state.phase, Phase::Success);
        assert_eq!(state.recommendations.len(), 1);
        assert_eq!(state.error, None);
        assert!(state.find_movie("3 Idiots").is_some());
    }

    #[test]
    fn test_failure_sets_phase_and_message() {
        let state = selected(&ViewState::default(), 1, "PK").apply(
            ViewEvent::RecommendationsFailed {
                invocation: 1,
                outcome: Outcome::Fallback,
                items: vec![movie(5, "Dangal")],
                error: RecommendationError::Unavailable,
            },
        );
        assert_eq!(state.phase, Phase::Fallback);
        assert_eq!(state.recommendations.len(), 1);
        assert_eq!(
            state.error.as_deref(),
            Some("Unable to fetch recommendations. Please try another movie.")
        );
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let state = selected(&ViewState::default(), 1, "PK");
        let state = selected(&state, 2, "War");
        let after = state.apply(ViewEvent::RecommendationsReady {
            invocation: 1,
            items: vec![movie(9, "Stale")],
        });
        assert_eq!(after, state);
        assert_eq!(after.phase, Phase::Loading);
    }

    #[test]
    fn test_from_recommendation() {
        let event = ViewEvent::from_recommendation(
            3,
            Recommendation {
                outcome: Outcome::Empty,
                items: vec![],
                error: Some(RecommendationError::NoneFound),
            },
        );
        assert!(matches!(
            event,
            ViewEvent::RecommendationsFailed {
                invocation: 3,
                outcome: Outcome::Empty,
                ..
            }
        ));
    }

    #[test]
    fn test_dispatch_publishes_new_snapshot() {
        use crate::services::providers::{MockMetadataProvider, MockRecommenderBackend};

        let state = AppState::new(
            Arc::new(MockMetadataProvider::new()),
            Arc::new(MockRecommenderBackend::new()),
            ImageUrls::new(String::new(), String::new(), "https://placeholder.local".to_string()),
        );

        tokio_test::block_on(async {
            let before = state.snapshot().await;
            let after = state
                .dispatch(ViewEvent::CatalogLoaded(vec![movie(1, "PK")]))
                .await;

            assert!(before.catalog.is_empty());
            assert_eq!(after.catalog.len(), 1);
            assert_eq!(state.snapshot().await, after);

            let err = state.select("Sholay").await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        });
    }

    #[test]
    fn test_late_older_selection_is_ignored() {
        let state = selected(&ViewState::default(), 2, "PK");
        let after = selected(&state, 1, "Dangal");
        assert_eq!(after, state);

        let after = after.apply(ViewEvent::RecommendationsFailed {
            invocation: 2,
            outcome: Outcome::Empty,
            items: vec![],
            error: RecommendationError::NoneFound,
        });
        assert_eq!(after.selected.as_ref().map(|m| m.title.as_str()), Some("PK"));
        assert_eq!(after.phase, Phase::Empty);
    }

    /// Backend whose answer for "Dangal" blocks until released
    struct GatedBackend {
        entered: Arc<Notify>,
        gate: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl RecommenderBackend for GatedBackend {
        async fn list_movies(&self) -> AppResult<Vec<String>> {
            Ok(vec![])
        }

        async fn recommend(&self, title: &str) -> AppResult<Vec<String>> {
            if title == "Dangal" {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            Ok(vec![])
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_overlapping_selections_settle_on_the_newest() {
        use crate::services::providers::MockMetadataProvider;

        let entered = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let state = AppState::new(
            Arc::new(MockMetadataProvider::new()),
            Arc::new(GatedBackend {
                entered: entered.clone(),
                gate: gate.clone(),
            }),
            ImageUrls::new(String::new(), String::new(), "https://placeholder.local".to_string()),
        );
        state
            .dispatch(ViewEvent::CatalogLoaded(vec![movie(1, "Dangal"), movie(2, "PK")]))
            .await;

        let older = {
            let state = state.clone();
            tokio::spawn(async move { state.select("Dangal").await })
        };
        entered.notified().await;

        let newer = state.select("PK").await.unwrap();
        gate.notify_one();
        let older = older.await.unwrap().unwrap();

        assert_eq!(older.selected.as_ref().map(|m| m.title.as_str()), Some("PK"));
        for snapshot in [newer, state.snapshot().await] {
            assert_eq!(
                snapshot.selected.as_ref().map(|m| m.title.as_str()),
                Some("PK")
            );
            assert_eq!(snapshot.phase, Phase::Empty);
        }
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let value = serde_json::to_value(ViewState::default()).unwrap();
        assert_eq!(value["phase"], "idle");
        assert_eq!(value["catalogLoaded"], false);
        assert!(value["selectionId"].is_null());
    }
}
