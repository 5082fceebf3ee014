use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::domain::{ParseCentsError, TransactionError};

#[derive(Error, Debug)]
pub enum AppError {
    /// Input breaks a data-model invariant. Nothing was written.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The backing store could not be read or written.
    #[error("Storage unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),

    /// An operation ran before `initialize()`. This is a caller bug.
    #[error("Ledger store used before initialization")]
    NotInitialized,
}

impl AppError {
    /// Stable machine-readable name, used on the bridge.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ConstraintViolation(_) => "constraint_violation",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::NotInitialized => "not_initialized",
        }
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        AppError::ConstraintViolation(err.to_string())
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::ConstraintViolation(err.to_string())
    }
}

/// Storage errors from the repository arrive as `anyhow::Error`.
/// SQLite CHECK and NOT NULL failures are input problems; anything else is the medium.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
            if is_input_constraint(db_err.kind(), db_err.message()) {
                return AppError::ConstraintViolation(db_err.message().to_string());
            }
        }
        AppError::StorageUnavailable(err)
    }
}

fn is_input_constraint(kind: ErrorKind, message: &str) -> bool {
    match kind {
        ErrorKind::CheckViolation | ErrorKind::NotNullViolation => true,
        // SQLite names the constraint type in the message
        ErrorKind::Other => {
            message.starts_with("CHECK constraint failed")
                || message.starts_with("NOT NULL constraint failed")
        }
        _ => false,
    }
}
