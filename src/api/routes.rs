use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/catalog", get(handlers::get_catalog))
        .route("/catalog/reload", post(handlers::reload_catalog))
        .route("/search", get(handlers::search_catalog))
        // Selection and recommendations
        .route("/selection", post(handlers::select_movie))
        .route("/state", get(handlers::get_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
