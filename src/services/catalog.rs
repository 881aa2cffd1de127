use crate::{
    models::Movie,
    services::{enrichment::MetadataEnricher, providers::RecommenderBackend},
};
use std::sync::Arc;

/// Most backend names enriched into the catalog; bounds the TMDB fan-out
pub const CATALOG_SIZE_CAP: usize = 24;

/// Built-in catalog used when the backend cannot list its movies
pub const FALLBACK_MOVIES: [&str; 18] = [
    "3 Idiots",
    "Dangal",
    "PK",
    "Bajrangi Bhaijaan",
    "Kabir Singh",
    "Pathaan",
    "Jawan",
    "Tiger 3",
    "War",
    "Dhoom 3",
    "Krrish 3",
    "Chennai Express",
    "Happy New Year",
    "Singham",
    "Golmaal Again",
    "Housefull 4",
    "Total Dhamaal",
    "Judwaa 2",
];

/// Builds the initial catalog from the backend's movie list
#[derive(Clone)]
pub struct CatalogLoader {
    backend: Arc<dyn RecommenderBackend>,
    enricher: MetadataEnricher,
}

impl CatalogLoader {
    pub fn new(backend: Arc<dyn RecommenderBackend>, enricher: MetadataEnricher) -> Self {
        Self { backend, enricher }
    }

    /// Loads and enriches the catalog
    ///
    /// Never fails: an unreachable backend switches to [`FALLBACK_MOVIES`],
    /// and if every enrichment fails the catalog is simply empty.
    pub async fn load(&self) -> Vec<Movie> {
        let names: Vec<String> = match self.backend.list_movies().await {
            Ok(names) => names.into_iter().take(CATALOG_SIZE_CAP).collect(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.backend.name(),
                    "Movie list unavailable, loading fallback catalog"
                );
                FALLBACK_MOVIES.iter().map(|name| name.to_string()).collect()
            }
        };

        let catalog = self.enricher.enrich_batch(&names).await;

        tracing::info!(
            requested = names.len(),
            loaded = catalog.len(),
            "Catalog loaded"
        );

        catalog
    }
}
