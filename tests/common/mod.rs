#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use video_store_web::db::{MemoryStore, Store};
use video_store_web::models::{Customer, Movie, NewCustomer, NewMovie, NewRental, Rental};
use video_store_web::rentals::{CheckoutPolicy, Clock};
use video_store_web::{routes, AppState};

/// The day every test app treats as today
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn days(n: i64) -> NaiveDate {
    today() + Duration::days(n)
}

/// Test app over an in-memory store seeded with two movies and two customers
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub alien: Movie,
    pub psycho: Movie,
    pub ripley: Customer,
    pub crane: Customer,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let alien = store.create_movie(NewMovie::titled("Alien", 5)).await.unwrap();
        let psycho = store.create_movie(NewMovie::titled("Psycho", 5)).await.unwrap();
        let ripley = store
            .create_customer(NewCustomer::new("Ellen Ripley", "98101"))
            .await
            .unwrap();
        let crane = store
            .create_customer(NewCustomer::new("Marion Crane", "85001"))
            .await
            .unwrap();

        let state = AppState::new(
            store.clone(),
            None,
            Clock::Fixed(today()),
            CheckoutPolicy::default(),
        );

        Self {
            store,
            app: routes::app(state),
            alien,
            psycho,
            ripley,
            crane,
        }
    }

    /// Insert a rental with any due date, bypassing the creation rule
    pub async fn rental(
        &self,
        movie: &Movie,
        customer: &Customer,
        due: NaiveDate,
        returned: bool,
    ) -> Rental {
        let mut rental = self
            .store
            .create_rental(NewRental::new(movie.id, customer.id, days(-20), days(-19)))
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

    pub async fn stored(&self, id: i64) -> Rental {
        self.store
            .find_rentals(Default::default())
            .await
            .unwrap()
            .into_iter()
            .find(|rental| rental.id == id)
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("POST", uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("PUT", uri, body).await
    }

    /// Send a body verbatim, for requests that are not well-formed JSON
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
