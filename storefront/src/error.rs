use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::model::GenericError;

/// A single violated input field, surfaced in validation error responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error taxonomy for the order endpoints.
///
/// Every failure is converted to a response at the handler boundary;
/// nothing is retried and storage failures never leak their details to the
/// caller.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Invalid data")]
    Validation(Vec<FieldError>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Order not found")]
    NotFound,

    #[error("{0}")]
    Rule(String),

    #[error("Internal error: {0}")]
    Storage(#[source] GenericError),
}

impl From<GenericError> for OrderError {
    fn from(err: GenericError) -> Self {
        OrderError::Storage(err)
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        match self {
            OrderError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid data", "errors": errors })),
            )
                .into_response(),
            OrderError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
                .into_response(),
            OrderError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Forbidden" })),
            )
                .into_response(),
            OrderError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Order not found" })),
            )
                .into_response(),
            OrderError::Rule(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            OrderError::Storage(err) => {
                tracing::error!(error = %err, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
