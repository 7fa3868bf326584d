//! `SQLite` implementation of [`ReminderRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use glowminder_app::ports::ReminderRepository;
use glowminder_domain::error::{ConflictError, GlowError, NotFoundError};
use glowminder_domain::glow::{Colour, Mode};
use glowminder_domain::id::{OwnerId, ReminderId};
use glowminder_domain::reminder::{Reminder, ReminderFilter, ReminderPatch};
use glowminder_domain::time::Timestamp;

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Reminder`].
struct Wrapper(Reminder);

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.to_utc())
        .map_err(decode)
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner_id: i64 = row.try_get("owner_id")?;
        let message: String = row.try_get("message")?;
        let colour: i64 = row.try_get("colour")?;
        let mode: i64 = row.try_get("mode")?;

        Ok(Self(Reminder {
            id: ReminderId::from_str(&id).map_err(decode)?,
            owner_id: OwnerId::new(owner_id),
            message,
            colour: Colour::from_code(colour).map_err(decode)?,
            mode: Mode::from_code(mode).map_err(decode)?,
            scheduled_at: parse_timestamp(row, "scheduled_at")?,
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO reminders (id, owner_id, message, colour, mode, scheduled_at, scheduled_score, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM reminders WHERE id = ?";
const SELECT_MANY: &str = "SELECT * FROM reminders WHERE (?1 IS NULL OR owner_id = ?1) ORDER BY scheduled_score ASC, created_at ASC, id ASC LIMIT ?2 OFFSET ?3";
const UPDATE: &str = "UPDATE reminders SET colour = ?, mode = ?, scheduled_at = ?, scheduled_score = ?, updated_at = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM reminders WHERE id = ?";

fn not_found(id: ReminderId) -> GlowError {
    NotFoundError {
        entity: "Reminder",
        id: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed reminder repository.
pub struct SqliteReminderRepository {
    pool: SqlitePool,
}

impl SqliteReminderRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReminderRepository for SqliteReminderRepository {
    fn create(
        &self,
        reminder: Reminder,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(reminder.id.to_string())
                .bind(reminder.owner_id.get())
                .bind(&reminder.message)
                .bind(reminder.colour.code())
                .bind(reminder.mode.code())
                .bind(reminder.scheduled_at.to_rfc3339())
                .bind(reminder.scheduled_at.timestamp())
                .bind(reminder.created_at.to_rfc3339())
                .bind(reminder.updated_at.to_rfc3339())
                .execute(&pool)
                .await;

            match result {
                Ok(_) => Ok(reminder),
                Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                    Err(ConflictError {
                        entity: "Reminder",
                        id: reminder.id.to_string(),
                    }
                    .into())
                }
                Err(err) => Err(StorageError::from(err).into()),
            }
        }
    }

    fn get_by_id(
        &self,
        id: ReminderId,
    ) -> impl Future<Output = Result<Option<Reminder>, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_many(
        &self,
        filter: ReminderFilter,
    ) -> impl Future<Output = Result<Vec<Reminder>, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            // LIMIT -1 means "no limit" in SQLite.
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_MANY)
                .bind(filter.owner_id.map(OwnerId::get))
                .bind(filter.limit.map_or(-1, i64::from))
                .bind(i64::from(filter.offset.unwrap_or(0)))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        patch: ReminderPatch,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(patch.id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let Some(Wrapper(mut reminder)) = row else {
                return Err(not_found(patch.id));
            };

            patch.apply(&mut reminder);
            sqlx::query(UPDATE)
                .bind(reminder.colour.code())
                .bind(reminder.mode.code())
                .bind(reminder.scheduled_at.to_rfc3339())
                .bind(reminder.scheduled_at.timestamp())
                .bind(reminder.updated_at.to_rfc3339())
                .bind(reminder.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(reminder)
        }
    }

    fn delete(&self, id: ReminderId) -> impl Future<Output = Result<(), GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(not_found(id));
            }
            Ok(())
        }
    }
}
