//! Reminder service — use-cases for creating and managing reminders.

use glowminder_domain::error::{GlowError, NotFoundError};
use glowminder_domain::id::ReminderId;
use glowminder_domain::reminder::{Reminder, ReminderFilter, ReminderPatch};
use glowminder_domain::task::ReminderTask;

use crate::ports::{ReminderRepository, TaskQueue};

/// Application service for reminder CRUD.
///
/// Writes touch two independent stores. The queue is always written first so
/// that a stored reminder is never left without a task; the opposite gap (a
/// task without a reminder) is tolerated by the scheduler.
pub struct ReminderService<R, Q> {
    repo: R,
    queue: Q,
}

impl<R: ReminderRepository, Q: TaskQueue> ReminderService<R, Q> {
    /// Create a new service backed by the given repository and queue.
    pub fn new(repo: R, queue: Q) -> Self {
        Self { repo, queue }
    }

    /// Validate, enqueue the delivery task, then store the reminder.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] if invariants fail, or the
    /// queue or repository error. When the record write fails after a
    /// successful enqueue the task stays behind and is dropped at drain time.
    #[tracing::instrument(skip(self, reminder), fields(reminder_id = %reminder.id, owner_id = %reminder.owner_id))]
    pub async fn create_reminder(&self, reminder: Reminder) -> Result<Reminder, GlowError> {
        reminder.validate()?;
        self.queue.enqueue(reminder.task()).await?;
        let created = self.repo.create(reminder).await?;
        tracing::info!(scheduled_at = %created.scheduled_at, "reminder created");
        Ok(created)
    }

    /// Look up a reminder by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::NotFound`] when no reminder with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_reminder(&self, id: ReminderId) -> Result<Reminder, GlowError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Reminder",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List reminders ordered by `scheduled_at`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_reminders(&self, filter: ReminderFilter) -> Result<Vec<Reminder>, GlowError> {
        self.repo.get_many(filter).await
    }

    /// Apply a partial update.
    ///
    /// Moving a reminder to a different second enqueues a task for the new
    /// instant. The task for the previous instant stays in the queue and is
    /// recognised as stale when drained. A patch that keeps the current second
    /// enqueues nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] for a patch that unsets colour or
    /// mode, [`GlowError::NotFound`] when the reminder is absent, or a
    /// storage error.
    #[tracing::instrument(skip(self, patch), fields(reminder_id = %patch.id))]
    pub async fn update_reminder(&self, patch: ReminderPatch) -> Result<Reminder, GlowError> {
        patch.validate()?;
        if let Some(scheduled_at) = patch.scheduled_at {
            let current = self.get_reminder(patch.id).await?;
            let task = ReminderTask::new(patch.id, scheduled_at);
            if current.is_scheduled_by(&task) {
                tracing::debug!("schedule unchanged, nothing to enqueue");
            } else {
                self.queue.enqueue(task).await?;
            }
        }
        self.repo.update(patch).await
    }

    /// Delete a reminder record. Its task is left to the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::NotFound`] when the reminder is absent, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_reminder(&self, id: ReminderId) -> Result<(), GlowError> {
        self.repo.delete(id).await
    }
}
