//! Rental models

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::field_error;
use crate::rentals::rules::{self, RentalClass};

/// Rental from the rentals table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Rental {
    pub id: i64,
    pub movie_id: i64,
    pub customer_id: i64,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
}

impl Rental {
    pub fn class(&self, today: NaiveDate) -> RentalClass {
        rules::classify(self.returned, self.due_date, today)
    }

    /// Check an update against the stored record.
    ///
    /// The due-date rule only applies on creation, so an overdue rental
    /// can still be closed. A returned rental stays returned.
    pub fn check_update(&self, previous: &Rental) -> Result<(), ValidationErrors> {
        if previous.returned && !self.returned {
            let mut errors = ValidationErrors::new();
            errors.add(
                "returned",
                field_error("immutable", "can't be changed once the rental is returned"),
            );
            return Err(errors);
        }
        Ok(())
    }
}

/// Fields for opening a rental.
///
/// `checkout_date` is the day the rental is created; the due date must
/// fall strictly after it.
#[derive(Debug, Clone, Validate)]
pub struct NewRental {
    #[validate(required(message = "must exist"))]
    pub movie_id: Option<i64>,
    #[validate(required(message = "must exist"))]
    pub customer_id: Option<i64>,
    pub checkout_date: NaiveDate,
    #[validate(required(message = "can't be blank"))]
    pub due_date: Option<NaiveDate>,
    pub returned: bool,
}

impl NewRental {
    pub fn new(
        movie_id: i64,
        customer_id: i64,
        checkout_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            movie_id: Some(movie_id),
            customer_id: Some(customer_id),
            checkout_date,
            due_date: Some(due_date),
            returned: false,
        }
    }

    /// Collect every field error rather than stopping at the first
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(due_date) = self.due_date {
            if !rules::is_valid_due_date(due_date, self.checkout_date) {
                errors.add(
                    "due_date",
                    field_error("not_future", "must be in the future"),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Rental joined with its movie title and customer details
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RentalDetail {
    pub id: i64,
    pub movie_id: i64,
    pub customer_id: i64,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
    pub title: String,
    pub name: String,
    pub postal_code: String,
}

impl RentalDetail {
    pub fn class(&self, today: NaiveDate) -> RentalClass {
        rules::classify(self.returned, self.due_date, today)
    }
}
