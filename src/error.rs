//! Error handling for the application

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::ValidationErrors;

use crate::catalog::CatalogError;
use crate::customers::CustomerError;
use crate::db::StoreError;
use crate::rentals::RentalError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Rental(#[from] RentalError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Request body could not be read as the expected JSON
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Field name -> messages, rendered as `{"errors": {...}}`
type FieldMessages = BTreeMap<String, Vec<String>>;

fn single(field: &str, message: String) -> FieldMessages {
    BTreeMap::from([(field.to_string(), vec![message])])
}

fn from_validation(errors: &ValidationErrors) -> FieldMessages {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn storage_failure(err: &StoreError) -> (StatusCode, FieldMessages) {
    tracing::error!("Storage error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        single("base", "Storage error".to_string()),
    )
}

impl AppError {
    fn status_and_messages(&self) -> (StatusCode, FieldMessages) {
        match self {
            AppError::Rental(err) => match err {
                RentalError::NotFound { entity, key } => {
                    let message = match *entity {
                        "title" => format!("No movie with title {key}"),
                        "customer_id" => format!("No customer with ID {key}"),
                        _ => format!("No outstanding {entity} for {key}"),
                    };
                    (StatusCode::NOT_FOUND, single(entity, message))
                }
                RentalError::InvalidInput { field, reason } => {
                    (StatusCode::BAD_REQUEST, single(field, reason.clone()))
                }
                RentalError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, from_validation(errors))
                }
                RentalError::OutOfStock { title } => (
                    StatusCode::CONFLICT,
                    single("title", format!("No copies of {title} available")),
                ),
                RentalError::Storage(err) => storage_failure(err),
            },
            AppError::Catalog(err) => match err {
                CatalogError::NotFound { title } => (
                    StatusCode::NOT_FOUND,
                    single("title", format!("No movie with title {title}")),
                ),
                CatalogError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, from_validation(errors))
                }
                CatalogError::Storage(err) => storage_failure(err),
            },
            AppError::Customer(err) => match err {
                CustomerError::NotFound { id } => (
                    StatusCode::NOT_FOUND,
                    single("customer_id", format!("No customer with ID {id}")),
                ),
                CustomerError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, from_validation(errors))
                }
                CustomerError::Storage(err) => storage_failure(err),
            },
            AppError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, single("base", reason.clone()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    single("base", "Internal error".to_string()),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = self.status_and_messages();
        (status, Json(json!({ "errors": errors }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
