//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before any statement reached the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single-row lookup matched no rows.
    #[error("row not found")]
    NotFound,

    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid database configuration: {0}")]
    Config(String),
}

impl DbError {
    /// `true` for [`DbError::NotFound`].
    ///
    /// Callers that do not care *why* a lookup came back empty (a missing row
    /// or a failed query) can branch on `is_err()` instead.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
