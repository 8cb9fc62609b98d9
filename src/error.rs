use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Error taxonomy for the HTTP surface. Every failure leaving a handler is
/// one of these, and all of them serialize to the same JSON envelope:
/// `{"error": true, "reason": ..., "status_code": ..., "details": ...?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing request fields.
    #[error("{reason}")]
    Validation {
        reason: String,
        details: Option<Value>,
    },
    /// An LLM or database call failed; the message names the step.
    #[error("{0}")]
    Upstream(String),
    /// The generation pipeline produced malformed output or the generator
    /// violated its contract; carries an embedded diagnostic.
    #[error("{0}")]
    Generation(String),
    /// Object storage rejected an upload (duplicate path, bucket failure).
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ApiError::Validation {
            reason: reason.into(),
            details: None,
        }
    }

    pub fn validation_with(reason: impl Into<String>, details: Value) -> Self {
        ApiError::Validation {
            reason: reason.into(),
            details: Some(details),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Generation(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": true,
            "reason": self.to_string(),
            "status_code": status.as_u16(),
        });
        if let ApiError::Validation {
            details: Some(details),
            ..
        } = &self
        {
            body["details"] = details.clone();
        }
        (status, Json(body)).into_response()
    }
}
