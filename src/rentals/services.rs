//! Rental service: check-out, check-in and the rental listings.
//!
//! The service resolves titles and customers, applies the rules in
//! [`super::rules`] and talks to storage through [`Store`]. It never logs
//! or retries; every failure comes back as a [`RentalError`].

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use validator::ValidationErrors;

use super::responses::RentalSummary;
use super::rules::{self, RentalClass};
use crate::db::{RentalFilter, Store, StoreError};
use crate::models::{Customer, Movie, NewRental, Rental};

/// Source of "today" for date rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Local calendar date of the host
    System,
    /// Always the given day
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(day) => *day,
        }
    }
}

/// Check-out policy switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Refuse check-out when no copy of the movie is available
    pub enforce_inventory: bool,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            enforce_inventory: true,
        }
    }
}

/// Rental operation error types
#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    /// `entity` is the request field that failed to resolve
    #[error("No {entity} found for {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("No copies of {title} available")]
    OutOfStock { title: String },

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for RentalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => RentalError::Validation(errors),
            other => RentalError::Storage(other),
        }
    }
}

pub type RentalResult<T> = Result<T, RentalError>;

/// Domain operations over rentals
#[derive(Clone)]
pub struct RentalService {
    store: Arc<dyn Store>,
    clock: Clock,
    policy: CheckoutPolicy,
}

impl RentalService {
    pub fn new(store: Arc<dyn Store>, clock: Clock, policy: CheckoutPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn require_movie(&self, title: &str) -> RentalResult<Movie> {
        self.store
            .find_movie_by_title(title)
            .await?
            .ok_or_else(|| RentalError::NotFound {
                entity: "title",
                key: title.to_string(),
            })
    }

    async fn require_customer(&self, customer_id: i64) -> RentalResult<Customer> {
        self.store
            .find_customer_by_id(customer_id)
            .await?
            .ok_or_else(|| RentalError::NotFound {
                entity: "customer_id",
                key: customer_id.to_string(),
            })
    }

    /// Copies of `movie` not currently rented out
    pub async fn available_inventory(&self, movie: &Movie) -> RentalResult<i32> {
        let outstanding = self
            .store
            .find_rentals(RentalFilter::outstanding_for_movie(movie.id))
            .await?;
        Ok(rules::available_inventory(movie.inventory, outstanding.len()))
    }

    /// Rent a copy of the movie titled `movie_title` to a customer.
    ///
    /// The rental starts today and must be due strictly after today.
    pub async fn check_out(
        &self,
        movie_title: &str,
        customer_id: i64,
        due_date: NaiveDate,
    ) -> RentalResult<Rental> {
        let movie = self.require_movie(movie_title).await?;
        let customer = self.require_customer(customer_id).await?;

        let today = self.today();
        if !rules::is_valid_due_date(due_date, today) {
            return Err(RentalError::InvalidInput {
                field: "due_date",
                reason: format!("{due_date} is not after {today}"),
            });
        }

        if self.policy.enforce_inventory && self.available_inventory(&movie).await? <= 0 {
            return Err(RentalError::OutOfStock { title: movie.title });
        }

        let rental = self
            .store
            .create_rental(NewRental::new(movie.id, customer.id, today, due_date))
            .await?;
        Ok(rental)
    }

    /// The outstanding rental a check-in for this pair would close
    pub async fn first_outstanding(
        &self,
        movie: &Movie,
        customer: &Customer,
    ) -> RentalResult<Option<Rental>> {
        let rentals = self
            .store
            .find_rentals(RentalFilter::outstanding_for(movie.id, customer.id))
            .await?;
        Ok(rules::first_outstanding(&rentals).cloned())
    }

    /// Return the customer's copy of the movie that is due soonest.
    ///
    /// The write only succeeds while the selected rental is still
    /// outstanding. If another check-in closed it first, selection runs
    /// again on fresh data.
    pub async fn check_in(&self, movie_title: &str, customer_id: i64) -> RentalResult<Rental> {
        let movie = self.require_movie(movie_title).await?;
        let customer = self.require_customer(customer_id).await?;

        loop {
            let mut rental = self
                .first_outstanding(&movie, &customer)
                .await?
                .ok_or_else(|| RentalError::NotFound {
                    entity: "rental",
                    key: format!("{} / {}", movie.title, customer.id),
                })?;

            if self.store.mark_returned(rental.id).await? {
                rental.returned = true;
                return Ok(rental);
            }
        }
    }

    async fn summaries(
        &self,
        filter: RentalFilter,
        class: RentalClass,
    ) -> RentalResult<Vec<RentalSummary>> {
        let today = self.today();
        let details = self.store.find_rental_details(filter).await?;
        Ok(details
            .into_iter()
            .filter(|detail| detail.class(today) == class)
            .map(RentalSummary::from)
            .collect())
    }

    /// Outstanding rentals due before today
    pub async fn overdue(&self) -> RentalResult<Vec<RentalSummary>> {
        self.summaries(RentalFilter::outstanding(), RentalClass::Overdue)
            .await
    }

    /// Rentals that have been checked back in
    pub async fn returned(&self) -> RentalResult<Vec<RentalSummary>> {
        self.summaries(RentalFilter::returned(), RentalClass::Returned)
            .await
    }

    /// Outstanding rentals due today or later
    pub async fn out_ok(&self) -> RentalResult<Vec<RentalSummary>> {
        self.summaries(RentalFilter::outstanding(), RentalClass::OutOk)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewCustomer, NewMovie};
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn days(n: i64) -> NaiveDate {
        today() + Duration::days(n)
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        service: RentalService,
        movie: Movie,
        other_movie: Movie,
        customer: Customer,
        other_customer: Customer,
    }

    async fn fixture_with(policy: CheckoutPolicy) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let movie = store
            .create_movie(NewMovie::titled("Alien", 10))
            .await
            .unwrap();
        let other_movie = store
            .create_movie(NewMovie::titled("Psycho", 10))
            .await
            .unwrap();
        let customer = store
            .create_customer(NewCustomer::new("Ellen Ripley", "98101"))
            .await
            .unwrap();
        let other_customer = store
            .create_customer(NewCustomer::new("Marion Crane", "85001"))
            .await
            .unwrap();
        let service = RentalService::new(store.clone(), Clock::Fixed(today()), policy);
        Fixture {
            store,
            service,
            movie,
            other_movie,
            customer,
            other_customer,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(CheckoutPolicy::default()).await
    }

    impl Fixture {
        /// Insert a rental with any due date, bypassing the creation rule
        async fn rental(
            &self,
            movie: &Movie,
            customer: &Customer,
            due: NaiveDate,
            returned: bool,
        ) -> Rental {
            let mut rental = self
                .store
                .create_rental(NewRental::new(
                    movie.id,
                    customer.id,
                    days(-40),
                    days(-39),
                ))
                .await
                .unwrap();
            rental.due_date = due;
            self.store.save_rental(&rental).await.unwrap();
            if returned {
                self.store.mark_returned(rental.id).await.unwrap();
                rental.returned = true;
            }
            rental
        }

        async fn stored(&self, id: i64) -> Rental {
            self.store
                .find_rentals(RentalFilter::all())
                .await
                .unwrap()
                .into_iter()
                .find(|rental| rental.id == id)
                .unwrap()
        }
    }

    // ==================== check_out tests ====================

    #[tokio::test]
    async fn test_check_out_creates_outstanding_rental() {
        let f = fixture().await;
        let rental = f.service.check_out("Alien", f.customer.id, days(5)).await.unwrap();

        assert_eq!(rental.checkout_date, today());
        assert_eq!(rental.due_date, days(5));
        assert!(!rental.returned);
        assert_eq!(rental.movie_id, f.movie.id);
        assert_eq!(rental.customer_id, f.customer.id);
    }

    #[tokio::test]
    async fn test_check_out_unknown_title() {
        let f = fixture().await;
        let err = f
            .service
            .check_out("NoSuchMovie", f.customer.id, days(5))
            .await
            .unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "title", .. });
    }

    #[tokio::test]
    async fn test_check_out_unknown_customer() {
        let f = fixture().await;
        let err = f.service.check_out("Alien", 13371337, days(5)).await.unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "customer_id", .. });
    }

    #[tokio::test]
    async fn test_check_out_due_date_must_be_future() {
        let f = fixture().await;
        for due in [days(-1), today()] {
            let err = f.service.check_out("Alien", f.customer.id, due).await.unwrap_err();
            assert_matches!(err, RentalError::InvalidInput { field: "due_date", .. });
        }
        assert!(f.service.check_out("Alien", f.customer.id, days(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_out_changes_available_inventory() {
        let f = fixture().await;
        assert_eq!(f.service.available_inventory(&f.movie).await.unwrap(), 10);

        f.service.check_out("Alien", f.customer.id, days(3)).await.unwrap();
        assert_eq!(f.service.available_inventory(&f.movie).await.unwrap(), 9);

        f.service.check_in("Alien", f.customer.id).await.unwrap();
        assert_eq!(f.service.available_inventory(&f.movie).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_check_out_rejected_when_out_of_stock() {
        let f = fixture().await;
        f.store.update_movie_inventory(f.movie.id, 1).await.unwrap();

        f.service.check_out("Alien", f.customer.id, days(3)).await.unwrap();
        let err = f
            .service
            .check_out("Alien", f.other_customer.id, days(3))
            .await
            .unwrap_err();
        assert_matches!(err, RentalError::OutOfStock { title } if title == "Alien");
    }

    #[tokio::test]
    async fn test_check_out_allowed_when_inventory_not_enforced() {
        let f = fixture_with(CheckoutPolicy {
            enforce_inventory: false,
        })
        .await;
        let movie = f.store.update_movie_inventory(f.movie.id, 0).await.unwrap();

        let rental = f.service.check_out("Alien", f.customer.id, days(3)).await.unwrap();
        assert_eq!(f.stored(rental.id).await, rental);
        assert!(!rental.returned);
        assert_eq!(f.service.available_inventory(&movie).await.unwrap(), 0);
    }

    // ==================== first_outstanding tests ====================

    #[tokio::test]
    async fn test_first_outstanding_prefers_earlier_due_dates() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(30), false).await;
        let first = f.rental(&f.movie, &f.customer, days(10), false).await;
        f.rental(&f.movie, &f.customer, days(20), false).await;

        let selected = f.service.first_outstanding(&f.movie, &f.customer).await.unwrap();
        assert_eq!(selected.map(|r| r.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_first_outstanding_ignores_returned_and_other_pairs() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(1), true).await;
        f.rental(&f.movie, &f.other_customer, days(2), false).await;
        f.rental(&f.other_movie, &f.customer, days(3), false).await;
        let outstanding = f.rental(&f.movie, &f.customer, days(30), false).await;

        let selected = f.service.first_outstanding(&f.movie, &f.customer).await.unwrap();
        assert_eq!(selected.map(|r| r.id), Some(outstanding.id));
    }

    #[tokio::test]
    async fn test_first_outstanding_none_when_all_returned() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(5), true).await;

        let selected = f.service.first_outstanding(&f.movie, &f.customer).await.unwrap();
        assert!(selected.is_none());
    }

    // ==================== check_in tests ====================

    #[tokio::test]
    async fn test_check_in_marks_rental_returned_once() {
        let f = fixture().await;
        let rental = f.rental(&f.movie, &f.customer, days(5), false).await;

        let returned = f.service.check_in("Alien", f.customer.id).await.unwrap();
        assert_eq!(returned.id, rental.id);
        assert!(returned.returned);
        assert!(f.stored(rental.id).await.returned);

        let err = f.service.check_in("Alien", f.customer.id).await.unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "rental", .. });
    }

    #[tokio::test]
    async fn test_check_in_closes_only_the_earliest_due() {
        let f = fixture().await;
        let base = f.rental(&f.movie, &f.customer, days(5), false).await;
        let soon = f.rental(&f.movie, &f.customer, days(3), false).await;
        let far = f.rental(&f.movie, &f.customer, days(15), false).await;

        f.service.check_in("Alien", f.customer.id).await.unwrap();

        assert!(f.stored(soon.id).await.returned);
        assert!(!f.stored(base.id).await.returned);
        assert!(!f.stored(far.id).await.returned);
    }

    #[tokio::test]
    async fn test_check_in_skips_earlier_returned_rental() {
        let f = fixture().await;
        let outstanding = f.rental(&f.movie, &f.customer, days(5), false).await;
        f.rental(&f.movie, &f.customer, days(3), true).await;

        let returned = f.service.check_in("Alien", f.customer.id).await.unwrap();
        assert_eq!(returned.id, outstanding.id);
    }

    #[tokio::test]
    async fn test_check_in_overdue_rental() {
        let f = fixture().await;
        let overdue = f.rental(&f.movie, &f.customer, days(-7), false).await;

        let returned = f.service.check_in("Alien", f.customer.id).await.unwrap();
        assert_eq!(returned.id, overdue.id);
    }

    #[tokio::test]
    async fn test_check_in_errors() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(5), false).await;

        let err = f.service.check_in("does not exist", f.customer.id).await.unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "title", .. });

        let err = f.service.check_in("Alien", 13371337).await.unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "customer_id", .. });

        let err = f.service.check_in("Psycho", f.other_customer.id).await.unwrap_err();
        assert_matches!(err, RentalError::NotFound { entity: "rental", .. });
    }

    #[tokio::test]
    async fn test_check_out_then_check_in() {
        let f = fixture().await;
        f.service.check_out("Alien", f.customer.id, days(5)).await.unwrap();
        f.service.check_in("Alien", f.customer.id).await.unwrap();

        let rentals = f.store.find_rentals(RentalFilter::all()).await.unwrap();
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].customer_id, f.customer.id);
        assert_eq!(rentals[0].movie_id, f.movie.id);
        assert_eq!(rentals[0].due_date, days(5));
        assert!(rentals[0].returned);
    }

    #[tokio::test]
    async fn test_concurrent_check_ins_close_distinct_rentals() {
        let f = fixture().await;
        let first = f.rental(&f.movie, &f.customer, days(2), false).await;
        let second = f.rental(&f.movie, &f.customer, days(4), false).await;

        let (a, b) = tokio::join!(
            f.service.check_in("Alien", f.customer.id),
            f.service.check_in("Alien", f.customer.id)
        );
        let mut ids = vec![a.unwrap().id, b.unwrap().id];
        ids.sort();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    // ==================== classification tests ====================

    #[tokio::test]
    async fn test_overdue_lists_only_late_outstanding() {
        let f = fixture().await;
        let late = f.rental(&f.movie, &f.customer, days(-3), false).await;
        f.rental(&f.other_movie, &f.customer, days(10), false).await;
        f.rental(&f.other_movie, &f.customer, days(-3), true).await;

        let overdue = f.service.overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "Alien");
        assert_eq!(overdue[0].customer_id, f.customer.id);
        assert_eq!(overdue[0].due_date, late.due_date);
    }

    #[tokio::test]
    async fn test_returned_in_creation_order() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(30), false).await;
        f.rental(&f.movie, &f.customer, days(-10), true).await;
        let second = f.rental(&f.movie, &f.other_customer, days(10), true).await;

        let returned = f.service.returned().await.unwrap();
        assert_eq!(returned.len(), 2);
        assert_eq!(returned.last().map(|r| r.customer_id), Some(second.customer_id));
        assert_eq!(returned.last().map(|r| r.name.as_str()), Some("Marion Crane"));
    }

    #[tokio::test]
    async fn test_out_ok_includes_due_today() {
        let f = fixture().await;
        let first = f.rental(&f.movie, &f.customer, days(10), false).await;
        f.rental(&f.movie, &f.other_customer, days(20), false).await;
        f.rental(&f.other_movie, &f.other_customer, days(10), true).await;
        f.rental(&f.other_movie, &f.customer, days(-30), false).await;
        f.rental(&f.other_movie, &f.customer, today(), false).await;

        let out_ok = f.service.out_ok().await.unwrap();
        assert_eq!(out_ok.len(), 3);
        assert_eq!(out_ok[0].due_date, first.due_date);
        assert!(out_ok.iter().any(|r| r.due_date == today()));
        assert!(f.service.overdue().await.unwrap().iter().all(|r| r.due_date != today()));
    }

    #[tokio::test]
    async fn test_classes_partition_all_rentals() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(10), true).await;
        f.rental(&f.movie, &f.other_customer, days(-10), false).await;
        f.rental(&f.other_movie, &f.other_customer, days(10), true).await;
        f.rental(&f.other_movie, &f.customer, days(-10), true).await;
        f.rental(&f.other_movie, &f.customer, today(), false).await;
        f.rental(&f.movie, &f.customer, days(1), false).await;

        let overdue = f.service.overdue().await.unwrap();
        let returned = f.service.returned().await.unwrap();
        let out_ok = f.service.out_ok().await.unwrap();
        let total = f.store.find_rentals(RentalFilter::all()).await.unwrap().len();

        assert_eq!(overdue.len() + returned.len() + out_ok.len(), total);
        assert_eq!((overdue.len(), returned.len(), out_ok.len()), (1, 3, 2));
    }

    #[tokio::test]
    async fn test_classification_is_idempotent() {
        let f = fixture().await;
        f.rental(&f.movie, &f.customer, days(-2), false).await;
        f.rental(&f.movie, &f.customer, days(2), false).await;
        f.rental(&f.movie, &f.customer, days(2), true).await;

        assert_eq!(
            f.service.overdue().await.unwrap(),
            f.service.overdue().await.unwrap()
        );
        assert_eq!(
            f.service.returned().await.unwrap(),
            f.service.returned().await.unwrap()
        );
        assert_eq!(
            f.service.out_ok().await.unwrap(),
            f.service.out_ok().await.unwrap()
        );
    }

    #[test]
    fn test_rental_error_display() {
        let err = RentalError::NotFound {
            entity: "title",
            key: "Alien".to_string(),
        };
        assert!(err.to_string().contains("Alien"));

        let err = RentalError::OutOfStock {
            title: "Psycho".to_string(),
        };
        assert!(err.to_string().contains("Psycho"));
    }
}
