//! Shared application state for axum handlers.

use std::sync::Arc;

use glowminder_app::ports::{Clock, ReminderRepository, TaskQueue};
use glowminder_app::services::conversation_service::ConversationService;
use glowminder_app::services::reminder_service::ReminderService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository, queue and clock types to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<R, Q, C> {
    /// Reminder CRUD service.
    pub reminder_service: Arc<ReminderService<R, Q>>,
    /// Per-owner conversation flow.
    pub conversation_service: Arc<ConversationService<R, Q, C>>,
    /// Stamps `updated_at` on patches.
    pub clock: Arc<C>,
}

impl<R, Q, C> Clone for AppState<R, Q, C> {
    fn clone(&self) -> Self {
        Self {
            reminder_service: Arc::clone(&self.reminder_service),
            conversation_service: Arc::clone(&self.conversation_service),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, Q, C> AppState<R, Q, C>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The reminder service is usually shared with the conversation service,
    /// hence the `Arc`s.
    pub fn new(
        reminder_service: Arc<ReminderService<R, Q>>,
        conversation_service: Arc<ConversationService<R, Q, C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            reminder_service,
            conversation_service,
            clock,
        }
    }
}
