/// Error taxonomy for the Store and Scheduler
///
/// Every fallible operation in this crate returns `StoreError`. The API
/// layer maps these onto HTTP status codes; see `sparkq_api::error::ApiError`.
use thiserror::Error;

/// Result alias used throughout `sparkq-core`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified error type for Store and Scheduler operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// State precondition violated: wrong task status, archived queue,
    /// reference still in use, duplicate name
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed request: bad JSON, missing field, non-positive timeout,
    /// unknown enum value
    #[error("invalid: {0}")]
    Invalid(String),

    /// Transient storage failure (lock timeout, busy database)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Database error that doesn't map to one of the above
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Stable textual code surfaced alongside the human message, e.g.
    /// `task.wrong_state`. Callers that need a machine-readable discriminant
    /// without a specific domain code fall back to the kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Invalid(_) => "invalid",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Database(_) => "internal",
            StoreError::Migration(_) => "internal",
        }
    }
}

/// Maps raw sqlx errors onto the taxonomy above, recognizing `SQLITE_BUSY`
/// as `Unavailable` rather than a generic database error.
impl StoreError {
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(code) = db_err.code() {
                // SQLITE_BUSY / SQLITE_LOCKED
                if code == "5" || code == "6" {
                    return StoreError::Unavailable(db_err.message().to_string());
                }
                if db_err.is_unique_violation() {
                    return StoreError::Conflict(db_err.message().to_string());
                }
            }
        }
        StoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(StoreError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(StoreError::Conflict("x".into()).kind(), "conflict");
        assert_eq!(StoreError::Invalid("x".into()).kind(), "invalid");
    }

    #[test]
    fn test_display() {
        let err = StoreError::Conflict("task already running".to_string());
        assert_eq!(err.to_string(), "conflict: task already running");
    }
}
