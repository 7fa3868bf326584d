//! Reminder repository port — persistence for reminder records.

use std::future::Future;
use std::sync::Arc;

use glowminder_domain::error::GlowError;
use glowminder_domain::id::ReminderId;
use glowminder_domain::reminder::{Reminder, ReminderFilter, ReminderPatch};

/// Repository for persisting and querying [`Reminder`]s.
pub trait ReminderRepository: Send + Sync {
    /// Store a new reminder.
    ///
    /// Fails with [`GlowError::Conflict`] when the id is already taken.
    fn create(
        &self,
        reminder: Reminder,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send;

    /// Get a reminder by its unique identifier.
    fn get_by_id(
        &self,
        id: ReminderId,
    ) -> impl Future<Output = Result<Option<Reminder>, GlowError>> + Send;

    /// Reminders matching `filter`, ordered by `scheduled_at` ascending.
    fn get_many(
        &self,
        filter: ReminderFilter,
    ) -> impl Future<Output = Result<Vec<Reminder>, GlowError>> + Send;

    /// Apply a partial update and return the stored result.
    ///
    /// Fails with [`GlowError::NotFound`] when the reminder is absent.
    fn update(
        &self,
        patch: ReminderPatch,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send;

    /// Delete a reminder.
    ///
    /// Fails with [`GlowError::NotFound`] when the reminder is absent.
    fn delete(&self, id: ReminderId) -> impl Future<Output = Result<(), GlowError>> + Send;
}

impl<T: ReminderRepository> ReminderRepository for Arc<T> {
    fn create(
        &self,
        reminder: Reminder,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        (**self).create(reminder)
    }

    fn get_by_id(
        &self,
        id: ReminderId,
    ) -> impl Future<Output = Result<Option<Reminder>, GlowError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_many(
        &self,
        filter: ReminderFilter,
    ) -> impl Future<Output = Result<Vec<Reminder>, GlowError>> + Send {
        (**self).get_many(filter)
    }

    fn update(
        &self,
        patch: ReminderPatch,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        (**self).update(patch)
    }

    fn delete(&self, id: ReminderId) -> impl Future<Output = Result<(), GlowError>> + Send {
        (**self).delete(id)
    }
}
