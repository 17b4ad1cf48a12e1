//! Customer models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::ValidationErrors;

use super::field_error;

/// Customer from the customers table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub postal_code: String,
}

/// Fields for registering a customer
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub postal_code: String,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Customers need a name; the postal code is optional
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", field_error("blank", "can't be blank"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
