//! Core rental rules.
//!
//! Pure functions over rental fields - no database access. Every
//! classification, selection and inventory decision the services make
//! goes through here.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Rental;

/// The three disjoint classes every rental falls into on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalClass {
    /// Outstanding and due strictly before today
    Overdue,
    /// Checked back in
    Returned,
    /// Outstanding and due today or later
    OutOk,
}

/// Classify a rental as of `today`.
///
/// A rental due today is not overdue yet.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use video_store_web::rentals::rules::{classify, RentalClass};
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(classify(false, today, today), RentalClass::OutOk);
/// assert_eq!(classify(false, today.pred_opt().unwrap(), today), RentalClass::Overdue);
/// assert_eq!(classify(true, today.pred_opt().unwrap(), today), RentalClass::Returned);
/// ```
pub fn classify(returned: bool, due_date: NaiveDate, today: NaiveDate) -> RentalClass {
    if returned {
        RentalClass::Returned
    } else if due_date < today {
        RentalClass::Overdue
    } else {
        RentalClass::OutOk
    }
}

/// A new rental must be due strictly after the day it is created
pub fn is_valid_due_date(due_date: NaiveDate, created_on: NaiveDate) -> bool {
    due_date > created_on
}

/// Order in which outstanding rentals are closed: earliest due date,
/// then earliest checkout date, then lowest id.
pub fn check_in_order(a: &Rental, b: &Rental) -> Ordering {
    a.due_date
        .cmp(&b.due_date)
        .then(a.checkout_date.cmp(&b.checkout_date))
        .then(a.id.cmp(&b.id))
}

/// Pick the rental a check-in should close.
///
/// Returned rentals are never candidates, whatever their due date.
pub fn first_outstanding<'a, I>(rentals: I) -> Option<&'a Rental>
where
    I: IntoIterator<Item = &'a Rental>,
{
    rentals
        .into_iter()
        .filter(|rental| !rental.returned)
        .min_by(|a, b| check_in_order(a, b))
}

/// Copies currently on the shelf.
///
/// Clamped at zero so a catalog that shrank below its outstanding
/// rentals reports no copies rather than a negative count.
pub fn available_inventory(inventory: i32, outstanding: usize) -> i32 {
    let outstanding = i32::try_from(outstanding).unwrap_or(i32::MAX);
    inventory.saturating_sub(outstanding).max(0)
}
