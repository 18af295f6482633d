//! API error handling utilities.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::error;

use crate::storage::StorageError;

/// API error response: status, client-facing message, optional diagnostic
/// details echoed into the body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        let details = match &e {
            StorageError::Query {
                detail: Some(detail),
                ..
            } => Some(json!({ "details": detail })),
            _ => None,
        };
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Storage error: {}", e),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Error: {} {}", self.status.as_u16(), self.message);

        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }

        (self.status, axum::Json(body)).into_response()
    }
}
