//! Customer registry: the people movies are checked out to.

pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{CustomerError, CustomerService};
