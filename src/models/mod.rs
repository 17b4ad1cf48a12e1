//! Database models for movies, customers and rentals

pub mod customer;
pub mod movie;
pub mod rental;

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

pub use customer::{Customer, NewCustomer};
pub use movie::{Movie, NewMovie};
pub use rental::{NewRental, Rental, RentalDetail};

/// Build a field error carrying a human-readable message
pub fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Aggregate of a single field failure
pub fn single_field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(code, message));
    errors
}
