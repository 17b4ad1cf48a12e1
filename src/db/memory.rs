//! In-process store for local development and tests

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RentalFilter, Store, StoreError, StoreResult};
use crate::models::{
    single_field_error, Customer, Movie, NewCustomer, NewMovie, NewRental, Rental, RentalDetail,
};

#[derive(Default)]
struct Tables {
    movies: Vec<Movie>,
    customers: Vec<Customer>,
    rentals: Vec<Rental>,
    last_movie_id: i64,
    last_customer_id: i64,
    last_rental_id: i64,
}

impl Tables {
    fn movie(&self, id: i64) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    fn customer(&self, id: i64) -> Option<&Customer> {
        self.customers.iter().find(|customer| customer.id == id)
    }
}

/// Store keeping every table in memory, in insertion order
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_movie_by_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables.movies.iter().find(|movie| movie.title == title).cloned())
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.tables.read().await.movies.clone())
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        movie.check().map_err(StoreError::Validation)?;

        let mut tables = self.tables.write().await;
        if tables.movies.iter().any(|existing| existing.title == movie.title) {
            return Err(StoreError::Validation(single_field_error(
                "title",
                "taken",
                "has already been taken",
            )));
        }

        tables.last_movie_id += 1;
        let created = Movie {
            id: tables.last_movie_id,
            title: movie.title,
            external_id: movie.external_id,
            overview: movie.overview,
            release_date: movie.release_date,
            image_url: movie.image_url,
            inventory: movie.inventory,
        };
        tables.movies.push(created.clone());
        Ok(created)
    }

    async fn update_movie_inventory(&self, movie_id: i64, inventory: i32) -> StoreResult<Movie> {
        if inventory < 0 {
            return Err(StoreError::Validation(single_field_error(
                "inventory",
                "range",
                "must be greater than or equal to 0",
            )));
        }

        let mut tables = self.tables.write().await;
        let movie = tables
            .movies
            .iter_mut()
            .find(|movie| movie.id == movie_id)
            .ok_or(StoreError::NotFound {
                entity: "movie",
                id: movie_id,
            })?;
        movie.inventory = inventory;
        Ok(movie.clone())
    }

    async fn find_customer_by_id(&self, id: i64) -> StoreResult<Option<Customer>> {
        Ok(self.tables.read().await.customer(id).cloned())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.tables.read().await.customers.clone())
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
        customer.check().map_err(StoreError::Validation)?;

        let mut tables = self.tables.write().await;
        tables.last_customer_id += 1;
        let created = Customer {
            id: tables.last_customer_id,
            name: customer.name,
            postal_code: customer.postal_code,
        };
        tables.customers.push(created.clone());
        Ok(created)
    }

    async fn find_rentals(&self, filter: RentalFilter) -> StoreResult<Vec<Rental>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rentals
            .iter()
            .filter(|rental| filter.matches(rental))
            .cloned()
            .collect())
    }

    async fn find_rental_details(&self, filter: RentalFilter) -> StoreResult<Vec<RentalDetail>> {
        let tables = self.tables.read().await;
        let details = tables
            .rentals
            .iter()
            .filter(|rental| filter.matches(rental))
            .filter_map(|rental| {
                let movie = tables.movie(rental.movie_id)?;
                let customer = tables.customer(rental.customer_id)?;
                Some(RentalDetail {
                    id: rental.id,
                    movie_id: rental.movie_id,
                    customer_id: rental.customer_id,
                    checkout_date: rental.checkout_date,
                    due_date: rental.due_date,
                    returned: rental.returned,
                    title: movie.title.clone(),
                    name: customer.name.clone(),
                    postal_code: customer.postal_code.clone(),
                })
            })
            .collect();
        Ok(details)
    }

    async fn create_rental(&self, rental: NewRental) -> StoreResult<Rental> {
        rental.check().map_err(StoreError::Validation)?;

        let mut tables = self.tables.write().await;
        let (movie_id, customer_id, due_date) =
            match (rental.movie_id, rental.customer_id, rental.due_date) {
                (Some(movie_id), Some(customer_id), Some(due_date)) => {
                    (movie_id, customer_id, due_date)
                }
                // check() already rejects missing fields
                _ => {
                    return Err(StoreError::Validation(single_field_error(
                        "movie_id",
                        "required",
                        "must exist",
                    )))
                }
            };
        if tables.movie(movie_id).is_none() {
            return Err(StoreError::Validation(single_field_error(
                "movie_id",
                "required",
                "must exist",
            )));
        }
        if tables.customer(customer_id).is_none() {
            return Err(StoreError::Validation(single_field_error(
                "customer_id",
                "required",
                "must exist",
            )));
        }

        tables.last_rental_id += 1;
        let created = Rental {
            id: tables.last_rental_id,
            movie_id,
            customer_id,
            checkout_date: rental.checkout_date,
            due_date,
            returned: rental.returned,
        };
        tables.rentals.push(created.clone());
        Ok(created)
    }

    async fn save_rental(&self, rental: &Rental) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .rentals
            .iter_mut()
            .find(|stored| stored.id == rental.id)
            .ok_or(StoreError::NotFound {
                entity: "rental",
                id: rental.id,
            })?;
        rental.check_update(stored).map_err(StoreError::Validation)?;
        *stored = rental.clone();
        Ok(())
    }

    async fn mark_returned(&self, rental_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .rentals
            .iter_mut()
            .find(|rental| rental.id == rental_id && !rental.returned)
        {
            Some(rental) => {
                rental.returned = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
