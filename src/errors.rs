//! Unified application error type.
//! All modules (db, worker, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Query failed: {0}")]
    QueryFailure(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    // ---------------------------
    // Worker / logic errors
    // ---------------------------
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// A command that cannot proceed in the current timer state.
    #[error("{0}")]
    Refused(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// True for errors that point to a bug in the calling layer rather than
    /// a runtime condition worth retrying.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            AppError::InvariantViolation(_) | AppError::NotImplemented(_)
        )
    }

    /// The message without the variant's prefix.
    pub fn detail(&self) -> String {
        match self {
            AppError::StorageUnavailable(m)
            | AppError::QueryFailure(m)
            | AppError::InvariantViolation(m)
            | AppError::NotImplemented(m)
            | AppError::Cancelled(m) => m.clone(),
            other => other.to_string(),
        }
    }
}
