use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chirper_core::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by handlers and middleware.
///
/// Only the canonical reason phrase of the status reaches the client; the
/// detail is logged server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("authorization header is missing")]
    Forbidden,
    #[error("no route for {0}")]
    NotFound(String),
    #[error("handler panicked")]
    Panicked,
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Panicked | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Unknown Error"),
        };
        (status, Json(body)).into_response()
    }
}
