//! `SQLite` implementation of [`TaskQueue`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use glowminder_app::ports::TaskQueue;
use glowminder_domain::error::GlowError;
use glowminder_domain::id::ReminderId;
use glowminder_domain::task::ReminderTask;

use crate::error::{StorageError, decode};

/// A drained row: the task plus its position in the queue.
struct Drained {
    seq: i64,
    score: i64,
    task: ReminderTask,
}

impl<'r> FromRow<'r, SqliteRow> for Drained {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let seq: i64 = row.try_get("seq")?;
        let score: i64 = row.try_get("score")?;
        let reminder_id: String = row.try_get("reminder_id")?;
        let scheduled_at: String = row.try_get("scheduled_at")?;

        let id = ReminderId::from_str(&reminder_id).map_err(decode)?;
        let scheduled_at = chrono::DateTime::parse_from_rfc3339(&scheduled_at)
            .map_err(decode)?
            .to_utc();

        Ok(Self {
            seq,
            score,
            task: ReminderTask::new(id, scheduled_at),
        })
    }
}

// Re-enqueueing a reminder at the same second keeps the existing entry.
const INSERT: &str = "INSERT INTO reminder_tasks (reminder_id, score, scheduled_at) VALUES (?, ?, ?) \
                      ON CONFLICT (reminder_id, score) DO NOTHING";
// One statement: selection and removal cannot be split by a concurrent writer.
const DRAIN_DUE: &str =
    "DELETE FROM reminder_tasks WHERE score <= ? RETURNING seq, reminder_id, score, scheduled_at";
const COUNT: &str = "SELECT COUNT(*) FROM reminder_tasks";

/// `SQLite`-backed task queue.
pub struct SqliteTaskQueue {
    pool: SqlitePool,
}

impl SqliteTaskQueue {
    /// Create a new queue using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TaskQueue for SqliteTaskQueue {
    fn enqueue(&self, task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(task.id.to_string())
                .bind(task.score())
                .bind(task.scheduled_at.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn drain_due(
        &self,
        cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut rows: Vec<Drained> = sqlx::query_as(DRAIN_DUE)
                .bind(cutoff)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            // RETURNING gives no ordering guarantee.
            rows.sort_unstable_by_key(|row| (row.score, row.seq));
            if !rows.is_empty() {
                tracing::debug!(cutoff, drained = rows.len(), "drained due tasks");
            }
            Ok(rows.into_iter().map(|row| row.task).collect())
        }
    }

    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            usize::try_from(count).map_err(|_| GlowError::from(StorageError::Count(count)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use glowminder_domain::time::from_unix;

    async fn setup() -> SqliteTaskQueue {
        let db = Config::new("sqlite::memory:").build().await.unwrap();
        SqliteTaskQueue::new(db.pool().clone())
    }

    fn task_at(secs: i64) -> ReminderTask {
        ReminderTask::new(ReminderId::new(), from_unix(secs))
    }

    #[tokio::test]
    async fn should_return_empty_when_queue_is_empty() {
        let queue = setup().await;
        assert!(queue.drain_due(i64::MAX).await.unwrap().is_empty());
        assert!(queue.drain_due(i64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_drain_task_scored_exactly_at_cutoff() {
        let queue = setup().await;
        let task = task_at(100);
        queue.enqueue(task).await.unwrap();

        assert!(queue.drain_due(99).await.unwrap().is_empty());
        assert_eq!(queue.drain_due(100).await.unwrap(), vec![task]);
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn should_order_by_score_then_insertion() {
        let queue = setup().await;
        let late = task_at(30);
        let tie_first = task_at(10);
        let tie_second = task_at(10);
        let middle = task_at(20);
        for task in [late, tie_first, tie_second, middle] {
            queue.enqueue(task).await.unwrap();
        }

        let drained = queue.drain_due(30).await.unwrap();

        assert_eq!(drained, vec![tie_first, tie_second, middle, late]);
    }

    #[tokio::test]
    async fn should_not_drain_tasks_enqueued_above_cutoff_during_drain() {
        let queue = setup().await;
        for secs in 0..20 {
            queue.enqueue(task_at(secs)).await.unwrap();
        }

        let late = task_at(1_000);
        let (drained, enqueued) = tokio::join!(queue.drain_due(100), queue.enqueue(late));
        enqueued.unwrap();

        let drained = drained.unwrap();
        assert_eq!(drained.len(), 20);
        assert!(drained.iter().all(|task| task.score() <= 100));
        assert_eq!(queue.drain_due(i64::MAX).await.unwrap(), vec![late]);
    }

    #[tokio::test]
    async fn should_keep_one_entry_when_same_reminder_is_enqueued_twice() {
        let queue = setup().await;
        let task = task_at(100);
        queue.enqueue(task).await.unwrap();
        queue.enqueue(task).await.unwrap();
        let moved = ReminderTask::new(task.id, from_unix(200));
        queue.enqueue(moved).await.unwrap();
        queue.enqueue(task).await.unwrap();

        assert_eq!(queue.len().await.unwrap(), 2);
        assert_eq!(queue.drain_due(i64::MAX).await.unwrap(), vec![task, moved]);
    }

    #[tokio::test]
    async fn should_count_pending_tasks() {
        let queue = setup().await;
        queue.enqueue(task_at(1)).await.unwrap();
        queue.enqueue(task_at(2)).await.unwrap();
        assert_eq!(queue.len().await.unwrap(), 2);

        queue.drain_due(1).await.unwrap();
        assert_eq!(queue.len().await.unwrap(), 1);
    }
}
