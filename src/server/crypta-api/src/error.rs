//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crypta_data::DataError;

use crate::models::{ErrorMessage, FieldError, ValidationErrors};

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No record with the requested id.
    #[error("not found")]
    NotFound,

    /// Request body could not be parsed.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Error from the data service.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Malformed(message) => bad_request(None, message),
            ApiError::Data(DataError::Validation { field, message }) => {
                bad_request(Some(field.to_string()), message)
            }
            ApiError::Data(DataError::Cryptography(e)) => {
                error!(error = %e, "Cryptography error");
                internal_error(format!("An application error occurred: {e}"))
            }
            ApiError::Data(DataError::Storage(e)) => {
                error!(error = %e, "Storage error");
                internal_error("An internal error occurred".to_string())
            }
        }
    }
}

fn bad_request(field: Option<String>, message: String) -> Response {
    let status = StatusCode::BAD_REQUEST;
    let body = ValidationErrors {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Bad Request").to_string(),
        errors: vec![FieldError {
            field,
            default_message: message,
        }],
    };
    (status, Json(body)).into_response()
}

fn internal_error(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorMessage { message })).into_response()
}
