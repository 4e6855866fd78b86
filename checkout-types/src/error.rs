//! Error types for the checkout service.

use crate::domain::Provider;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Unknown payment provider: {0}")]
    UnknownProvider(String),

    #[error("Config does not match provider {provider}: {reason}")]
    ConfigMismatch { provider: Provider, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes. `StoreUnavailable` and `Duplicate`
/// carry the internal detail for logging only; it is never sent to callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store refused a write on a unique key
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::StoreUnavailable(e),
            RepoError::Transaction(e) => AppError::StoreUnavailable(e),
            RepoError::Conflict(e) => AppError::Duplicate(e),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
