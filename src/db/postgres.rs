//! PostgreSQL-backed store

use async_trait::async_trait;
use sqlx::PgPool;

use super::{queries, RentalFilter, Store, StoreError, StoreResult};
use crate::cache::AppCache;
use crate::models::{
    single_field_error, Customer, Movie, NewCustomer, NewMovie, NewRental, Rental, RentalDetail,
};

/// Store backed by a sqlx pool, with catalog lookups cached
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    cache: AppCache,
}

impl PgStore {
    pub fn new(pool: PgPool, cache: AppCache) -> Self {
        Self { pool, cache }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Field named by a violated rentals foreign key, if that is what failed
fn foreign_key_field(err: &sqlx::Error) -> Option<&'static str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Some(rental_reference(db_err.constraint()))
        }
        _ => None,
    }
}

fn rental_reference(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("rentals_customer_id_fkey") => "customer_id",
        _ => "movie_id",
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        queries::ping(&self.pool).await
    }

    async fn find_movie_by_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        if let Some(cached) = self.cache.movies.get(title).await {
            tracing::debug!("Cache HIT for movie: {}", title);
            return Ok(Some((*cached).clone()));
        }

        tracing::debug!("Cache MISS for movie: {}", title);
        let movie = queries::get_movie_by_title(&self.pool, title).await?;
        if let Some(movie) = &movie {
            self.cache.insert_movie(movie.clone()).await;
        }
        Ok(movie)
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        queries::get_movies(&self.pool).await
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        movie.check().map_err(StoreError::Validation)?;

        match queries::insert_movie(&self.pool, &movie).await {
            Ok(created) => {
                self.cache.insert_movie(created.clone()).await;
                Ok(created)
            }
            Err(err) if is_unique_violation(&err) => Err(StoreError::Validation(
                single_field_error("title", "taken", "has already been taken"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_movie_inventory(&self, movie_id: i64, inventory: i32) -> StoreResult<Movie> {
        if inventory < 0 {
            return Err(StoreError::Validation(single_field_error(
                "inventory",
                "range",
                "must be greater than or equal to 0",
            )));
        }

        let movie = queries::update_movie_inventory(&self.pool, movie_id, inventory)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "movie",
                id: movie_id,
            })?;
        self.cache.invalidate_movie(&movie.title).await;
        Ok(movie)
    }

    async fn find_customer_by_id(&self, id: i64) -> StoreResult<Option<Customer>> {
        queries::get_customer(&self.pool, id).await
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        queries::get_customers(&self.pool).await
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
        customer.check().map_err(StoreError::Validation)?;
        queries::insert_customer(&self.pool, &customer).await
    }

    async fn find_rentals(&self, filter: RentalFilter) -> StoreResult<Vec<Rental>> {
        queries::get_rentals(&self.pool, filter).await
    }

    async fn find_rental_details(&self, filter: RentalFilter) -> StoreResult<Vec<RentalDetail>> {
        queries::get_rental_details(&self.pool, filter).await
    }

    async fn create_rental(&self, rental: NewRental) -> StoreResult<Rental> {
        rental.check().map_err(StoreError::Validation)?;

        match (rental.movie_id, rental.customer_id) {
            (Some(movie_id), Some(customer_id)) => {
                let inserted =
                    queries::insert_rental(&self.pool, movie_id, customer_id, &rental).await;
                match inserted {
                    Err(StoreError::Database(err)) => match foreign_key_field(&err) {
                        Some(field) => Err(StoreError::Validation(single_field_error(
                            field,
                            "required",
                            "must exist",
                        ))),
                        None => Err(StoreError::Database(err)),
                    },
                    result => result,
                }
            }
            // check() already rejects missing references
            _ => Err(StoreError::Validation(single_field_error(
                "movie_id",
                "required",
                "must exist",
            ))),
        }
    }

    async fn save_rental(&self, rental: &Rental) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let previous = queries::lock_rental(&mut tx, rental.id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "rental",
                id: rental.id,
            })?;
        rental.check_update(&previous).map_err(StoreError::Validation)?;

        queries::update_rental(&mut tx, rental).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn mark_returned(&self, rental_id: i64) -> StoreResult<bool> {
        queries::mark_returned(&self.pool, rental_id).await
    }
}
