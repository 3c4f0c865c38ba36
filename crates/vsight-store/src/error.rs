//! Result cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing cached analyses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid asset id: {0}")]
    InvalidAssetId(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn invalid_asset_id(msg: impl Into<String>) -> Self {
        Self::InvalidAssetId(msg.into())
    }

    /// Check if error is transient (pool exhaustion, busy database).
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Database(db)) => db
                .code()
                .map(|code| code == "5" || code == "6")
                .unwrap_or(false),
            _ => false,
        }
    }
}
