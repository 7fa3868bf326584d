//! Storage-specific error type wrapping sqlx errors.

use glowminder_domain::error::GlowError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A count did not fit the platform's `usize`.
    #[error("row count {0} out of range")]
    Count(i64),
}

impl From<StorageError> for GlowError {
    fn from(err: StorageError) -> Self {
        Self::store_unavailable(err)
    }
}

/// Shorthand for decode failures inside `FromRow` impls.
pub(crate) fn decode(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
