//! Conversation service — drives the reminder drafting flow for chat
//! front-ends and keeps one [`ConversationState`] per owner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use glowminder_domain::conversation::{
    ConversationInput, ConversationSettings, ConversationState, ConversationStep, Effect, Prompt,
    ReminderDraft,
};
use glowminder_domain::error::{GlowError, NotFoundError};
use glowminder_domain::id::{OwnerId, ReminderId};
use glowminder_domain::reminder::{Reminder, ReminderFilter};

use crate::ports::{Clock, ReminderRepository, TaskQueue};
use crate::services::reminder_service::ReminderService;

/// What a chat transport should render after an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationReply {
    pub text: String,
    #[serde(flatten)]
    pub step: ConversationStep,
    pub reminders: Vec<Reminder>,
}

impl ConversationReply {
    fn new(prompt: Prompt, step: ConversationStep) -> Self {
        Self {
            text: prompt.text().to_string(),
            step,
            reminders: Vec::new(),
        }
    }

    fn with_reminders(mut self, reminders: Vec<Reminder>) -> Self {
        self.reminders = reminders;
        self
    }
}

type Session = Arc<tokio::sync::Mutex<ConversationState>>;

/// Keyed conversation store plus the use-cases its effects trigger.
///
/// Each owner has their own session lock; the map lock is only held to look a
/// session up, never across a store call. Sessions back at the menu are
/// dropped from the map.
pub struct ConversationService<R, Q, C> {
    reminders: Arc<ReminderService<R, Q>>,
    clock: C,
    settings: ConversationSettings,
    sessions: Mutex<HashMap<OwnerId, Session>>,
}

impl<R, Q, C> ConversationService<R, Q, C>
where
    R: ReminderRepository,
    Q: TaskQueue,
    C: Clock,
{
    pub fn new(
        reminders: Arc<ReminderService<R, Q>>,
        clock: C,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            reminders,
            clock,
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Feed one input from `owner_id` through the flow.
    ///
    /// Inputs from the same owner are handled one at a time; different owners
    /// never wait on each other.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::NotFound`] when deleting a reminder that does not
    /// exist or belongs to someone else, or a storage error while listing or
    /// deleting. A failed creation is answered with a reply instead.
    #[tracing::instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn handle(
        &self,
        owner_id: OwnerId,
        input: ConversationInput,
    ) -> Result<ConversationReply, GlowError> {
        let session = self.session(owner_id);
        let result = {
            let mut state = session.lock().await;
            self.advance(owner_id, input, &mut state).await
        };
        drop(session);
        self.forget_if_idle(owner_id);
        result
    }

    /// The current step for `owner_id`. Owners without a session are at the
    /// menu.
    pub async fn step(&self, owner_id: OwnerId) -> ConversationStep {
        let session = self.lock_sessions().get(&owner_id).cloned();
        match session {
            Some(session) => session.lock().await.step,
            None => ConversationStep::Menu,
        }
    }

    #[cfg(test)]
    fn active_sessions(&self) -> usize {
        self.lock_sessions().len()
    }

    async fn advance(
        &self,
        owner_id: OwnerId,
        input: ConversationInput,
        state: &mut ConversationState,
    ) -> Result<ConversationReply, GlowError> {
        let effect = state.handle(owner_id, input, &self.settings);
        tracing::debug!(step = ?state.step, "conversation advanced");

        match effect {
            Effect::Reply(prompt) => Ok(ConversationReply::new(prompt, state.step)),
            Effect::CreateReminder(draft) => Ok(self.create(draft, state).await),
            Effect::ListReminders { offset, limit } => {
                let page = self.page(owner_id, offset, limit).await?;
                Ok(Self::listing(page, state.step))
            }
            Effect::DeleteReminder(id) => {
                self.delete_owned(owner_id, id).await?;
                let (offset, limit) = match state.step {
                    ConversationStep::Listing { offset } => (offset, self.settings.page_size),
                    _ => (0, self.settings.page_size),
                };
                let page = self.page(owner_id, offset, limit).await?;
                Ok(ConversationReply::new(Prompt::Deleted, state.step).with_reminders(page))
            }
        }
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<OwnerId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session(&self, owner_id: OwnerId) -> Session {
        Arc::clone(self.lock_sessions().entry(owner_id).or_default())
    }

    /// Drop the owner's session when it is idle and nobody else holds it.
    ///
    /// Clones are only taken under the map lock, so a strong count of one
    /// means no other input for this owner is queued.
    fn forget_if_idle(&self, owner_id: OwnerId) {
        let mut sessions = self.lock_sessions();
        let idle = sessions.get(&owner_id).is_some_and(|session| {
            Arc::strong_count(session) == 1
                && session.try_lock().is_ok_and(|state| state.is_idle())
        });
        if idle {
            sessions.remove(&owner_id);
            tracing::debug!(active = sessions.len(), "conversation session closed");
        }
    }

    async fn create(&self, draft: ReminderDraft, state: &mut ConversationState) -> ConversationReply {
        let result = match draft.into_reminder(self.clock.now_utc()) {
            Ok(reminder) => self.reminders.create_reminder(reminder).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(reminder) => ConversationReply::new(Prompt::Created, state.step)
                .with_reminders(vec![reminder]),
            Err(err) => {
                tracing::warn!(error = %err, "could not create reminder from conversation");
                state.reset();
                ConversationReply::new(Prompt::StartWithNewReminder, state.step)
            }
        }
    }

    async fn page(
        &self,
        owner_id: OwnerId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Reminder>, GlowError> {
        self.reminders
            .list_reminders(ReminderFilter::page(owner_id, limit, offset))
            .await
    }

    async fn delete_owned(&self, owner_id: OwnerId, id: ReminderId) -> Result<(), GlowError> {
        let reminder = self.reminders.get_reminder(id).await?;
        if reminder.owner_id != owner_id {
            return Err(NotFoundError {
                entity: "Reminder",
                id: id.to_string(),
            }
            .into());
        }
        self.reminders.delete_reminder(id).await
    }

    fn listing(page: Vec<Reminder>, step: ConversationStep) -> ConversationReply {
        let prompt = if page.is_empty() {
            Prompt::NoReminders
        } else {
            Prompt::Reminders
        };
        ConversationReply::new(prompt, step).with_reminders(page)
    }
}
