//! Task queue port — time-ordered reminder tasks.

use std::future::Future;
use std::sync::Arc;

use glowminder_domain::error::GlowError;
use glowminder_domain::task::ReminderTask;

/// Durable queue of [`ReminderTask`]s scored by their scheduled instant.
///
/// The queue knows nothing about reminder records; a task may outlive the
/// reminder it points at.
pub trait TaskQueue: Send + Sync {
    /// Insert a task scored by `task.score()`.
    fn enqueue(&self, task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send;

    /// Remove and return every task with `score <= cutoff`.
    ///
    /// Selection and removal are one atomic step: a task enqueued while the
    /// drain runs with a score above `cutoff` is neither returned nor removed.
    /// Results are ordered by ascending score, ties by insertion order.
    fn drain_due(
        &self,
        cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send;

    /// Number of pending tasks.
    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send;

    /// Whether no task is pending.
    fn is_empty(&self) -> impl Future<Output = Result<bool, GlowError>> + Send {
        let len = self.len();
        async move { Ok(len.await? == 0) }
    }
}

impl<T: TaskQueue> TaskQueue for Arc<T> {
    fn enqueue(&self, task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send {
        (**self).enqueue(task)
    }

    fn drain_due(
        &self,
        cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send {
        (**self).drain_due(cutoff)
    }

    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send {
        (**self).len()
    }
}
