use reviewroster_core::ReviewError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Invalid pull request status: {0}")]
    InvalidStatus(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl DbError {
    /// True if the error is a UNIQUE / PRIMARY KEY constraint violation
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::SqlxError(sqlx::Error::Database(db_err)) if db_err.is_unique_violation())
    }
}

impl From<DbError> for ReviewError {
    fn from(e: DbError) -> Self {
        ReviewError::Internal(e.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
