//! Reminder — a message that makes a lamp glow at a scheduled instant.

use serde::{Deserialize, Serialize};

use crate::error::{GlowError, ValidationError};
use crate::glow::{Colour, GlowCommand, Mode};
use crate::id::{OwnerId, ReminderId};
use crate::task::ReminderTask;
use crate::time::{Timestamp, now};

/// A durable reminder record.
///
/// The identifier is immutable. Colour and mode are always set on a stored
/// reminder; [`Reminder::validate`] enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner_id: OwnerId,
    pub message: String,
    pub colour: Colour,
    pub mode: Mode,
    pub scheduled_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reminder {
    /// Create a builder for constructing a [`Reminder`].
    #[must_use]
    pub fn builder() -> ReminderBuilder {
        ReminderBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] when the message is blank or
    /// the colour or mode is unset.
    pub fn validate(&self) -> Result<(), GlowError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        GlowCommand::new(self.colour, self.mode)?;
        Ok(())
    }

    /// The queue entry that triggers this reminder.
    #[must_use]
    pub fn task(&self) -> ReminderTask {
        ReminderTask::new(self.id, self.scheduled_at)
    }

    /// The device command to run when this reminder fires.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if colour or mode is unset.
    pub fn glow_command(&self) -> Result<GlowCommand, ValidationError> {
        GlowCommand::new(self.colour, self.mode)
    }

    /// Whether `task` still points at this reminder's current schedule.
    ///
    /// A task left behind by a reschedule carries the old instant.
    #[must_use]
    pub fn is_scheduled_by(&self, task: &ReminderTask) -> bool {
        task.id == self.id && task.score() == self.scheduled_at.timestamp()
    }
}

/// Step-by-step builder for [`Reminder`].
#[derive(Debug, Default)]
pub struct ReminderBuilder {
    id: Option<ReminderId>,
    owner_id: Option<OwnerId>,
    message: Option<String>,
    colour: Colour,
    mode: Mode,
    scheduled_at: Option<Timestamp>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
}

impl ReminderBuilder {
    #[must_use]
    pub fn id(mut self, id: ReminderId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: impl Into<OwnerId>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn scheduled_at(mut self, scheduled_at: Timestamp) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }

    /// Set both `created_at` and `updated_at`.
    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(created_at);
        self
    }

    /// Consume the builder, validate, and return a [`Reminder`].
    ///
    /// A missing id is generated; missing creation times default to now.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] if the owner or schedule is
    /// missing, or if [`Reminder::validate`] fails.
    pub fn build(self) -> Result<Reminder, GlowError> {
        let owner_id = self
            .owner_id
            .ok_or(ValidationError::MissingField("owner_id"))?;
        let scheduled_at = self
            .scheduled_at
            .ok_or(ValidationError::MissingField("scheduled_at"))?;
        let created_at = self.created_at.unwrap_or_else(now);

        let reminder = Reminder {
            id: self.id.unwrap_or_default(),
            owner_id,
            message: self.message.unwrap_or_default(),
            colour: self.colour,
            mode: self.mode,
            scheduled_at,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        };
        reminder.validate()?;
        Ok(reminder)
    }
}

/// Listing filter. Results are always ordered by `scheduled_at` ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReminderFilter {
    pub owner_id: Option<OwnerId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ReminderFilter {
    /// One page of an owner's reminders.
    #[must_use]
    pub fn page(owner_id: OwnerId, limit: u32, offset: u32) -> Self {
        Self {
            owner_id: Some(owner_id),
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPatch {
    pub id: ReminderId,
    pub colour: Option<Colour>,
    pub mode: Option<Mode>,
    pub scheduled_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl ReminderPatch {
    /// An empty patch for `id`, stamped with `updated_at`.
    #[must_use]
    pub fn new(id: ReminderId, updated_at: Timestamp) -> Self {
        Self {
            id,
            colour: None,
            mode: None,
            scheduled_at: None,
            updated_at,
        }
    }

    /// Reject patches that would unset colour or mode.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] on an explicit `Unset`.
    pub fn validate(&self) -> Result<(), GlowError> {
        if self.colour == Some(Colour::Unset) {
            return Err(ValidationError::UnsetColour.into());
        }
        if self.mode == Some(Mode::Unset) {
            return Err(ValidationError::UnsetMode.into());
        }
        Ok(())
    }

    /// Apply this patch to `reminder` in place.
    pub fn apply(&self, reminder: &mut Reminder) {
        if let Some(colour) = self.colour {
            reminder.colour = colour;
        }
        if let Some(mode) = self.mode {
            reminder.mode = mode;
        }
        if let Some(scheduled_at) = self.scheduled_at {
            reminder.scheduled_at = scheduled_at;
        }
        reminder.updated_at = self.updated_at;
    }
}
