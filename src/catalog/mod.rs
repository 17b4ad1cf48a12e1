//! Movie catalog: listing, adding movies and inventory administration.

pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{CatalogError, CatalogService};
