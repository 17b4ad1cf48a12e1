//! Storage for the movie catalog, customers and rentals.
//!
//! [`Store`] is the only thing the services talk to. [`PgStore`] backs it
//! with PostgreSQL; [`MemoryStore`] keeps everything in process for local
//! development and tests.

pub mod memory;
pub mod postgres;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use validator::ValidationErrors;

use crate::models::{
    Customer, Movie, NewCustomer, NewMovie, NewRental, Rental, RentalDetail,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filter for rental lookups. `None` matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RentalFilter {
    pub movie_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub returned: Option<bool>,
}

impl RentalFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn outstanding() -> Self {
        Self {
            returned: Some(false),
            ..Self::default()
        }
    }

    pub fn returned() -> Self {
        Self {
            returned: Some(true),
            ..Self::default()
        }
    }

    pub fn outstanding_for_movie(movie_id: i64) -> Self {
        Self {
            movie_id: Some(movie_id),
            returned: Some(false),
            ..Self::default()
        }
    }

    pub fn outstanding_for(movie_id: i64, customer_id: i64) -> Self {
        Self {
            movie_id: Some(movie_id),
            customer_id: Some(customer_id),
            returned: Some(false),
        }
    }

    pub fn matches(&self, rental: &Rental) -> bool {
        self.movie_id.map_or(true, |id| rental.movie_id == id)
            && self.customer_id.map_or(true, |id| rental.customer_id == id)
            && self.returned.map_or(true, |returned| rental.returned == returned)
    }
}

/// Storage collaborator for the rental services.
///
/// Listing methods return records in creation order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    async fn find_movie_by_title(&self, title: &str) -> StoreResult<Option<Movie>>;

    async fn list_movies(&self) -> StoreResult<Vec<Movie>>;

    /// Fails with a `title` validation error when the title is taken
    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie>;

    async fn update_movie_inventory(&self, movie_id: i64, inventory: i32) -> StoreResult<Movie>;

    async fn find_customer_by_id(&self, id: i64) -> StoreResult<Option<Customer>>;

    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    /// Validates with [`NewCustomer::check`] before inserting
    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer>;

    async fn find_rentals(&self, filter: RentalFilter) -> StoreResult<Vec<Rental>>;

    async fn find_rental_details(&self, filter: RentalFilter) -> StoreResult<Vec<RentalDetail>>;

    /// Validates with [`NewRental::check`] before inserting
    async fn create_rental(&self, rental: NewRental) -> StoreResult<Rental>;

    /// Overwrite a stored rental, validated with [`Rental::check_update`]
    async fn save_rental(&self, rental: &Rental) -> StoreResult<()>;

    /// Flip `returned` from false to true for one rental.
    ///
    /// Returns `false` when the rental was already returned (or missing),
    /// so two callers racing for the same row cannot both claim it.
    async fn mark_returned(&self, rental_id: i64) -> StoreResult<bool>;
}

/// Create the PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Apply the embedded migrations
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
