//! Request DTOs for rental API endpoints.
//!
//! Fields are read loosely so a missing or unparseable value is reported
//! against the field it belongs to.

use chrono::NaiveDate;
use serde::Deserialize;

use super::services::RentalError;

fn blank(field: &'static str) -> RentalError {
    RentalError::InvalidInput {
        field,
        reason: "can't be blank".to_string(),
    }
}

fn require_customer_id(customer_id: Option<i64>) -> Result<i64, RentalError> {
    customer_id.ok_or_else(|| blank("customer_id"))
}

/// Request to check a movie out
#[derive(Debug, Deserialize)]
pub struct CheckOutRequest {
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// ISO 8601 calendar date (`YYYY-MM-DD`)
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CheckOutRequest {
    pub fn customer_id(&self) -> Result<i64, RentalError> {
        require_customer_id(self.customer_id)
    }

    pub fn due_date(&self) -> Result<NaiveDate, RentalError> {
        let raw = self
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| blank("due_date"))?;

        raw.parse().map_err(|_| RentalError::InvalidInput {
            field: "due_date",
            reason: "is not a valid date".to_string(),
        })
    }
}

/// Request to check a movie back in
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub customer_id: Option<i64>,
}

impl CheckInRequest {
    pub fn customer_id(&self) -> Result<i64, RentalError> {
        require_customer_id(self.customer_id)
    }
}
