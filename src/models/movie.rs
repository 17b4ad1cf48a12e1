//! Movie catalog models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::field_error;

/// Movie from the movies table.
///
/// `inventory` is the total number of copies owned. How many are on the
/// shelf right now is derived from outstanding rentals, see
/// [`crate::rentals::rules::available_inventory`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub external_id: Option<i64>,
    pub overview: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: String,
    pub inventory: i32,
}

/// Fields for adding a movie to the catalog
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewMovie {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub external_id: Option<i64>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub inventory: i32,
}

impl NewMovie {
    pub fn titled(title: impl Into<String>, inventory: i32) -> Self {
        Self {
            title: title.into(),
            inventory,
            ..Self::default()
        }
    }

    /// Collect every field error rather than stopping at the first
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.title.trim().is_empty() {
            errors.add("title", field_error("blank", "can't be blank"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
