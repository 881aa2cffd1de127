use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    services::search,
};

use super::{AppState, ViewState};

// Request types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub title: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// The catalog grid
pub async fn get_catalog(State(state): State<AppState>) -> Json<Vec<Movie>> {
    let snapshot = state.snapshot().await;
    Json(snapshot.catalog.clone())
}

/// Incremental search over the loaded catalog
pub async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<Movie>> {
    let snapshot = state.snapshot().await;
    Json(search::search(&snapshot.catalog, &params.q))
}

/// Current view snapshot
pub async fn get_state(State(state): State<AppState>) -> Json<ViewState> {
    let snapshot = state.snapshot().await;
    Json(ViewState::clone(&snapshot))
}

/// Select a movie and fetch its recommendations
pub async fn select_movie(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> AppResult<Json<ViewState>> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Movie title cannot be empty".to_string(),
        ));
    }

    let snapshot = state.select(&request.title).await?;
    Ok(Json(ViewState::clone(&snapshot)))
}

/// Re-run the catalog loader
pub async fn reload_catalog(State(state): State<AppState>) -> Json<Vec<Movie>> {
    let snapshot = state.load_catalog().await;
    Json(snapshot.catalog.clone())
}
