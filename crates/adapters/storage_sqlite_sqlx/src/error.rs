//! Storage-specific error type wrapping sqlx errors.

use localhome_domain::error::HomeError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// A stored value is not valid JSON for its key.
    #[error("invalid stored value for {key}")]
    Json {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for HomeError {
    fn from(err: StorageError) -> Self {
        Self::transport(err)
    }
}
