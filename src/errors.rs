//! Centralized error handling.
//!
//! Provides a unified error type for the whole crate. Validation failures are
//! NOT errors: they are reported as named booleans in the per-use-case check
//! structs. `AppError` covers store and infrastructure failures only.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A targeted row was expected to exist but did not.
    ///
    /// Optional lookups return `Ok(None)` instead of this variant.
    #[error("resource not found")]
    NotFound,

    /// A unique constraint rejected a write (e.g. a registration lost the
    /// check-then-insert race on username/email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store transport or query failure, propagated uninterpreted.
    #[error("database error")]
    Database(#[source] DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // Unique-constraint violations are a distinct failure mode: the
        // caller must not retry them (retrying a duplicate-key registration
        // would loop), so they get their own variant.
        if let Some(SqlErr::UniqueConstraintViolation(constraint)) = err.sql_err() {
            return AppError::Conflict(constraint);
        }
        if matches!(err, DbErr::RecordNotUpdated) {
            return AppError::NotFound;
        }
        AppError::Database(err)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_updated_maps_to_not_found() {
        let err = AppError::from(DbErr::RecordNotUpdated);
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AppError::NotFound.code(), "NOT_FOUND");
        assert_eq!(
            AppError::Conflict("users.username".to_string()).code(),
            "CONFLICT"
        );
        assert_eq!(AppError::internal("boom").code(), "INTERNAL_ERROR");
    }
}
