//! Rental domain for the video store.
//!
//! Check-out and check-in of movie copies, plus the overdue, returned and
//! out-ok listings that partition every rental.

pub mod requests;
pub mod responses;
pub mod routes;
pub mod rules;
pub mod services;

// Re-export commonly used items
pub use routes::router;
pub use rules::RentalClass;
pub use services::{CheckoutPolicy, Clock, RentalError, RentalService};
