use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::LedgerError;

/// Error body returned by every endpoint: `{"message": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map a ledger error, hiding internal details behind `failure`
    ///
    /// Internal errors are logged with `context` (usually the expense id).
    pub fn from_ledger(err: LedgerError, failure: &str, context: &str) -> Self {
        let status = ledger_error_status(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(context, error = %err, "{}", failure);
            return Self::new(status, failure);
        }
        Self::new(status, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

#[must_use]
pub(crate) fn ledger_error_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Unreadable request bodies are client errors with the same JSON shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"message": self.message}))).into_response()
    }
}
