//! Request extractors whose failures render as application errors.

use axum::async_trait;
use axum::extract::{FromRequest, Request};

use crate::error::AppError;

/// JSON request body.
///
/// Same as [`axum::Json`] on success. Malformed bodies are rejected with
/// a 400 and the usual `{"errors": ...}` shape instead of axum's plain
/// text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}
