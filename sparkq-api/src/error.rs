/// Error handling for the API server
///
/// Unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>`, which converts to the stable `{"detail", "code"}`
/// body via `IntoResponse`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sparkq_core::error::StoreError;
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, message: String },
    NotFound { code: &'static str, message: String },
    Conflict { code: &'static str, message: String },
    Unavailable { code: &'static str, message: String },
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { code: "invalid", message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { code: "not_found", message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { message, .. } => write!(f, "bad request: {message}"),
            ApiError::NotFound { message, .. } => write!(f, "not found: {message}"),
            ApiError::Conflict { message, .. } => write!(f, "conflict: {message}"),
            ApiError::Unavailable { message, .. } => write!(f, "unavailable: {message}"),
            ApiError::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match self {
            ApiError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, Some(code), message),
            ApiError::NotFound { code, message } => (StatusCode::NOT_FOUND, Some(code), message),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, Some(code), message),
            ApiError::Unavailable { code, message } => {
                (StatusCode::SERVICE_UNAVAILABLE, Some(code), message)
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("internal"),
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            detail,
            code: code.map(str::to_string),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound { code: "not_found", message: msg },
            StoreError::Conflict(msg) => {
                ApiError::Conflict { code: conflict_code(&msg), message: msg }
            }
            StoreError::Invalid(msg) => ApiError::BadRequest { code: "invalid", message: msg },
            StoreError::Unavailable(msg) => {
                ApiError::Unavailable { code: "unavailable", message: msg }
            }
            StoreError::Database(_) | StoreError::Migration(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Best-effort stable code derived from the conflict message, in the
/// `task.wrong_state` / `queue.archived` / `tool.in_use` style. Falls back
/// to a generic code when the message doesn't match a known shape.
fn conflict_code(message: &str) -> &'static str {
    if message.contains("not running") {
        "task.wrong_state"
    } else if message.contains("not in a terminal state") {
        "task.wrong_state"
    } else if message.contains("not queued") {
        "task.wrong_state"
    } else if message.contains("archived") {
        "queue.archived"
    } else if message.contains("ended") {
        "queue.ended"
    } else if message.contains("still referenced by tasks") {
        "tool.in_use"
    } else if message.contains("still referenced by a tool") {
        "task_class.in_use"
    } else {
        "conflict"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("bad payload");
        assert_eq!(err.to_string(), "bad request: bad payload");
    }

    #[test]
    fn test_store_not_found_maps_to_404_code() {
        let err: ApiError = StoreError::NotFound("task tsk_1 not found".into()).into();
        assert!(matches!(err, ApiError::NotFound { code: "not_found", .. }));
    }

    #[test]
    fn test_conflict_code_wrong_state() {
        assert_eq!(conflict_code("task tsk_1 is not running"), "task.wrong_state");
        assert_eq!(conflict_code("queue que_1 is archived"), "queue.archived");
    }
}
