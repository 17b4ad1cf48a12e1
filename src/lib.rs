//! Video store rental service.
//!
//! Tracks the movie catalog and the lifecycle of rentals: check-out,
//! check-in and the overdue / returned / out-ok listings.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod customers;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod rentals;
pub mod routes;

use std::sync::Arc;

use cache::AppCache;
use catalog::CatalogService;
use customers::CustomerService;
use db::Store;
use rentals::{CheckoutPolicy, Clock, RentalService};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rentals: RentalService,
    pub catalog: CatalogService,
    pub customers: CustomerService,
    /// Present when the store keeps a movie cache
    pub cache: Option<AppCache>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        cache: Option<AppCache>,
        clock: Clock,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            rentals: RentalService::new(store.clone(), clock, policy),
            catalog: CatalogService::new(store.clone()),
            customers: CustomerService::new(store.clone()),
            store,
            cache,
        }
    }
}
