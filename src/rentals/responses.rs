//! Response DTOs for rental API endpoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::RentalDetail;

/// One row of the overdue / returned / out-ok listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentalSummary {
    pub title: String,
    pub customer_id: i64,
    pub name: String,
    pub postal_code: String,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl From<RentalDetail> for RentalSummary {
    fn from(detail: RentalDetail) -> Self {
        Self {
            title: detail.title,
            customer_id: detail.customer_id,
            name: detail.name,
            postal_code: detail.postal_code,
            checkout_date: detail.checkout_date,
            due_date: detail.due_date,
        }
    }
}

/// Response for check-out and check-in
#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: i64,
    pub title: String,
    pub customer_id: i64,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
}
