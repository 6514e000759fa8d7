//! Internal helpers for input normalization and driver error inspection.
//!
//! These utilities are **not** part of the public API.

use sea_orm::{DbErr, RuntimeErr, SqlErr, sqlx};

use crate::{EngineError, ResultEngine};

/// Trim a required name and reject it when empty.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidOperation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Reject zero and negative amounts.
pub(crate) fn ensure_positive_amount(amount: i64) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::InvalidOperation(format!(
            "amount must be > 0, got {amount}"
        )));
    }
    Ok(())
}

/// `true` when the driver reports a violated `CHECK` constraint.
pub(crate) fn is_check_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::CheckViolation)
        }
        _ => false,
    }
}

/// `true` when the driver reports a violated unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
