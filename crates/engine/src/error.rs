//! The module contains the error the engine can throw.
//!
//! Business errors are reported with a dedicated variant so the HTTP layer can
//! map them to a status code:
//!
//! - [`InvalidOperation`] for self-transfers and non-positive amounts.
//! - [`UserNotFound`] / [`ItemNotFound`] for unresolved names or ids.
//! - [`InsufficientFunds`] when a debit would make a balance negative.
//! - [`ExistingKey`] when a registration collides with an existing name.
//!
//! [`DeadlineExceeded`] and [`Database`] are infrastructure errors: their
//! detail is meant for logs, not for callers.
//!
//!  [`InvalidOperation`]: EngineError::InvalidOperation
//!  [`UserNotFound`]: EngineError::UserNotFound
//!  [`ItemNotFound`]: EngineError::ItemNotFound
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`DeadlineExceeded`]: EngineError::DeadlineExceeded
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("\"{0}\" user not found!")]
    UserNotFound(String),
    #[error("\"{0}\" item not found!")]
    ItemNotFound(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for store/runtime failures unrelated to business rules.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidOperation(a), Self::InvalidOperation(b)) => a == b,
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::ItemNotFound(a), Self::ItemNotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::DeadlineExceeded(a), Self::DeadlineExceeded(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
