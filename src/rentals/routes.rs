//! Rental route handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use super::requests::{CheckInRequest, CheckOutRequest};
use super::responses::{RentalResponse, RentalSummary};
use crate::error::Result;
use crate::extract::JsonBody;
use crate::models::Rental;
use crate::AppState;

/// Mount the rental routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rentals/overdue", get(overdue))
        .route("/rentals/returned", get(returned))
        .route("/rentals/out-ok", get(out_ok))
        .route("/rentals/:title/check-out", post(check_out))
        .route("/rentals/:title/check-in", post(check_in))
}

fn rental_response(rental: Rental, title: String) -> RentalResponse {
    RentalResponse {
        id: rental.id,
        title,
        customer_id: rental.customer_id,
        checkout_date: rental.checkout_date,
        due_date: rental.due_date,
        returned: rental.returned,
    }
}

/// POST /rentals/:title/check-out
async fn check_out(
    State(state): State<AppState>,
    Path(title): Path<String>,
    JsonBody(request): JsonBody<CheckOutRequest>,
) -> Result<Json<RentalResponse>> {
    let customer_id = request.customer_id()?;
    let due_date = request.due_date()?;

    let rental = state.rentals.check_out(&title, customer_id, due_date).await?;
    tracing::info!(
        rental_id = rental.id,
        %title,
        customer_id = rental.customer_id,
        "Checked out"
    );

    Ok(Json(rental_response(rental, title)))
}

/// POST /rentals/:title/check-in
async fn check_in(
    State(state): State<AppState>,
    Path(title): Path<String>,
    JsonBody(request): JsonBody<CheckInRequest>,
) -> Result<Json<RentalResponse>> {
    let rental = state.rentals.check_in(&title, request.customer_id()?).await?;
    tracing::info!(
        rental_id = rental.id,
        %title,
        customer_id = rental.customer_id,
        "Checked in"
    );

    Ok(Json(rental_response(rental, title)))
}

/// GET /rentals/overdue
async fn overdue(State(state): State<AppState>) -> Result<Json<Vec<RentalSummary>>> {
    Ok(Json(state.rentals.overdue().await?))
}

/// GET /rentals/returned
async fn returned(State(state): State<AppState>) -> Result<Json<Vec<RentalSummary>>> {
    Ok(Json(state.rentals.returned().await?))
}

/// GET /rentals/out-ok
async fn out_ok(State(state): State<AppState>) -> Result<Json<Vec<RentalSummary>>> {
    Ok(Json(state.rentals.out_ok().await?))
}
