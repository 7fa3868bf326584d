//! Opening the reminder database and keeping its schema current.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// How to reach the reminder database.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:glowminder.db` or `sqlite::memory:`).
    pub database_url: String,
    pub max_connections: u32,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Config {
    /// Defaults for everything but the URL.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .busy_timeout(self.busy_timeout);
        if self.is_in_memory() {
            return Ok(options);
        }
        // The scheduler drains while the API writes; WAL lets readers through.
        Ok(options.journal_mode(SqliteJournalMode::Wal))
    }

    /// Open the pool and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is malformed, the database cannot
    /// be opened, or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        let mut pool = SqlitePoolOptions::new().max_connections(self.max_connections);
        if self.is_in_memory() {
            // An in-memory database lives only as long as one of its connections.
            pool = pool.min_connections(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = pool.connect_with(self.connect_options()?).await?;

        let database = Database { pool };
        database.migrate().await?;
        tracing::info!(
            database_url = %self.database_url,
            max_connections = self.max_connections,
            "reminder database ready"
        );
        Ok(database)
    }
}

/// An open reminder database.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Apply migrations that have not run yet. Already-applied ones are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Migration`] when a migration fails or the
    /// recorded history no longer matches the embedded one.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("reminder database closed");
    }
}
