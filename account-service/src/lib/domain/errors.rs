use thiserror::Error;

/// Error for persistence operations.
///
/// Shared by every repository port so the orchestrator can surface store
/// failures uniformly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    RowNotFound(String),

    #[error("Stored record is invalid: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(
                    db_err
                        .constraint()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| db_err.message().to_string()),
                );
            }
        }
        StoreError::Database(err.to_string())
    }
}
