//! Response DTOs for catalog API endpoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Movie;

/// Response for a newly added movie
#[derive(Debug, Serialize)]
pub struct CreatedMovieResponse {
    pub id: i64,
    pub title: String,
    pub external_id: Option<i64>,
}

impl From<Movie> for CreatedMovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            external_id: movie.external_id,
        }
    }
}

/// Movie detail with live availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieDetailResponse {
    pub title: String,
    pub overview: String,
    pub release_date: Option<NaiveDate>,
    pub inventory: i32,
    pub available_inventory: i32,
}
