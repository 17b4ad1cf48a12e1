//! Customer route handlers

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::extract::JsonBody;
use crate::models::{Customer, NewCustomer};
use crate::AppState;

/// Mount the customer routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(register))
        .route("/customers/:id", get(show))
}

/// GET /customers
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    Ok(Json(state.customers.list().await?))
}

/// POST /customers
async fn register(
    State(state): State<AppState>,
    JsonBody(customer): JsonBody<NewCustomer>,
) -> Result<Json<Customer>> {
    let customer = state.customers.register(customer).await?;
    tracing::info!(customer_id = customer.id, "Customer registered");
    Ok(Json(customer))
}

/// GET /customers/:id
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>> {
    Ok(Json(state.customers.show(id).await?))
}
