//! Catalog route handlers

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use super::requests::SetInventoryRequest;
use super::responses::{CreatedMovieResponse, MovieDetailResponse};
use crate::error::Result;
use crate::extract::JsonBody;
use crate::models::{Movie, NewMovie};
use crate::AppState;

/// Mount the catalog routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list).post(create))
        .route("/movies/:title", get(show))
        .route("/movies/:title/inventory", put(set_inventory))
}

/// GET /movies
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.list().await?))
}

/// POST /movies
async fn create(
    State(state): State<AppState>,
    JsonBody(movie): JsonBody<NewMovie>,
) -> Result<Json<CreatedMovieResponse>> {
    let movie = state.catalog.create(movie).await?;
    tracing::info!(movie_id = movie.id, title = %movie.title, "Movie added");
    Ok(Json(movie.into()))
}

/// GET /movies/:title
async fn show(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<MovieDetailResponse>> {
    Ok(Json(state.catalog.show(&title).await?))
}

/// PUT /movies/:title/inventory
async fn set_inventory(
    State(state): State<AppState>,
    Path(title): Path<String>,
    JsonBody(request): JsonBody<SetInventoryRequest>,
) -> Result<Json<Movie>> {
    let movie = state.catalog.set_inventory(&title, request.inventory).await?;
    tracing::info!(movie_id = movie.id, inventory = movie.inventory, "Inventory updated");
    Ok(Json(movie))
}
