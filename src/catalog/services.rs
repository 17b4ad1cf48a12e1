//! Catalog service functions with storage access.

use std::sync::Arc;

use validator::ValidationErrors;

use super::responses::MovieDetailResponse;
use crate::db::{RentalFilter, Store, StoreError};
use crate::models::{single_field_error, Movie, NewMovie};
use crate::rentals::rules;

/// Catalog error types
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No movie with title {title}")]
    NotFound { title: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => CatalogError::Validation(errors),
            other => CatalogError::Storage(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Movie catalog operations
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_movie(&self, title: &str) -> CatalogResult<Movie> {
        self.store
            .find_movie_by_title(title)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                title: title.to_string(),
            })
    }

    /// All movies in the order they were added
    pub async fn list(&self) -> CatalogResult<Vec<Movie>> {
        Ok(self.store.list_movies().await?)
    }

    /// Add a movie; titles are unique
    pub async fn create(&self, movie: NewMovie) -> CatalogResult<Movie> {
        movie.check().map_err(CatalogError::Validation)?;
        Ok(self.store.create_movie(movie).await?)
    }

    /// Movie detail with copies currently on the shelf
    pub async fn show(&self, title: &str) -> CatalogResult<MovieDetailResponse> {
        let movie = self.require_movie(title).await?;
        let outstanding = self
            .store
            .find_rentals(RentalFilter::outstanding_for_movie(movie.id))
            .await?;

        Ok(MovieDetailResponse {
            available_inventory: rules::available_inventory(movie.inventory, outstanding.len()),
            title: movie.title,
            overview: movie.overview,
            release_date: movie.release_date,
            inventory: movie.inventory,
        })
    }

    /// Administrative update of the total number of copies
    pub async fn set_inventory(&self, title: &str, inventory: i32) -> CatalogResult<Movie> {
        if inventory < 0 {
            return Err(CatalogError::Validation(single_field_error(
                "inventory",
                "range",
                "must be greater than or equal to 0",
            )));
        }

        let movie = self.require_movie(title).await?;
        Ok(self.store.update_movie_inventory(movie.id, inventory).await?)
    }
}
