//! Conversation — the step-by-step flow a chat user goes through to build a
//! reminder, list their reminders, and delete them.
//!
//! The state machine is pure: [`ConversationState::handle`] consumes one
//! input and returns an [`Effect`] for the application layer to carry out.
//! Where the state lives (one entry per owner) is the caller's concern.

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GlowError, ValidationError};
use crate::glow::{Colour, Mode};
use crate::id::{OwnerId, ReminderId};
use crate::reminder::Reminder;
use crate::time::Timestamp;

/// Expected input format for reminder times.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Where a user currently is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConversationStep {
    #[default]
    Menu,
    ChoosingTime,
    EnteringText,
    ChoosingColour,
    ChoosingMode,
    Listing {
        offset: u32,
    },
}

/// One thing the user did: pressed a menu button, typed text, or tapped an
/// inline choice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationInput {
    Start,
    Help,
    NewReminder,
    ListReminders,
    Text { text: String },
    Choice { data: String },
}

/// Canned replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    Welcome,
    Help,
    AskTime,
    AskText,
    AskColour,
    AskMode,
    InvalidTime,
    InvalidColour,
    InvalidMode,
    Created,
    Deleted,
    Reminders,
    NoReminders,
    TryAgain,
    StartWithNewReminder,
}

impl Prompt {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Welcome => "Hello! I'm a reminder bot",
            Self::Help => {
                "Help:\n\
                 - list reminders to view scheduled reminders\n\
                 - new reminder to create one\n\
                 - delete to remove an existing reminder\n\
                 - prev / next to scroll through the list"
            }
            Self::AskTime => "Please enter the time in format 'YYYY-MM-DD HH:MM'",
            Self::AskText => "Please enter a reminder text",
            Self::AskColour => "Choose an effect colour",
            Self::AskMode => "Choose an effect mode",
            Self::InvalidTime => "Invalid time format. Please use 'YYYY-MM-DD HH:MM'",
            Self::InvalidColour => "Invalid colour. Please choose red, green or blue",
            Self::InvalidMode => "Invalid mode. Please choose blinking or static",
            Self::Created => "Reminder successfully created",
            Self::Deleted => "Reminder successfully deleted",
            Self::Reminders => "Your reminders",
            Self::NoReminders => "You have no scheduled reminders",
            Self::TryAgain => "Please try again",
            Self::StartWithNewReminder => "Please start by choosing new reminder",
        }
    }
}

/// Per-deployment knobs for the flow.
#[derive(Debug, Clone, Copy)]
pub struct ConversationSettings {
    /// Offset at which typed times are interpreted before normalising to UTC.
    pub utc_offset: FixedOffset,
    /// How many reminders one listing page shows.
    pub page_size: u32,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            page_size: 5,
        }
    }
}

/// A reminder being filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub owner_id: OwnerId,
    pub scheduled_at: Option<Timestamp>,
    pub message: Option<String>,
    pub colour: Colour,
    pub mode: Mode,
}

impl ReminderDraft {
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            scheduled_at: None,
            message: None,
            colour: Colour::Unset,
            mode: Mode::Unset,
        }
    }

    /// Turn a finished draft into a reminder with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`GlowError::InvalidInput`] if any field is still missing.
    pub fn into_reminder(self, created_at: Timestamp) -> Result<Reminder, GlowError> {
        let mut builder = Reminder::builder()
            .id(ReminderId::new())
            .owner_id(self.owner_id)
            .message(self.message.unwrap_or_default())
            .colour(self.colour)
            .mode(self.mode)
            .created_at(created_at);
        if let Some(at) = self.scheduled_at {
            builder = builder.scheduled_at(at);
        }
        builder.build()
    }
}

/// What the application layer should do after an input was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Just answer.
    Reply(Prompt),
    /// Persist the finished draft and confirm.
    CreateReminder(ReminderDraft),
    /// Show one page of the owner's reminders.
    ListReminders { offset: u32, limit: u32 },
    /// Delete one of the owner's reminders.
    DeleteReminder(ReminderId),
}

/// Per-owner conversation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub step: ConversationStep,
    pub draft: Option<ReminderDraft>,
}

impl ConversationState {
    /// Go back to the menu, dropping any draft.
    pub fn reset(&mut self) {
        self.step = ConversationStep::Menu;
        self.draft = None;
    }

    /// Whether the owner is back at the menu with nothing in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.step == ConversationStep::Menu && self.draft.is_none()
    }

    /// Advance the state machine by one input.
    pub fn handle(
        &mut self,
        owner_id: OwnerId,
        input: ConversationInput,
        settings: &ConversationSettings,
    ) -> Effect {
        match input {
            ConversationInput::Start => {
                self.reset();
                Effect::Reply(Prompt::Welcome)
            }
            ConversationInput::Help => {
                self.reset();
                Effect::Reply(Prompt::Help)
            }
            ConversationInput::NewReminder => {
                self.step = ConversationStep::ChoosingTime;
                self.draft = Some(ReminderDraft::new(owner_id));
                Effect::Reply(Prompt::AskTime)
            }
            ConversationInput::ListReminders => {
                self.draft = None;
                self.step = ConversationStep::Listing { offset: 0 };
                Effect::ListReminders {
                    offset: 0,
                    limit: settings.page_size,
                }
            }
            ConversationInput::Text { text } => self.handle_text(&text, settings),
            ConversationInput::Choice { data } => self.handle_choice(&data, settings),
        }
    }

    fn handle_text(&mut self, text: &str, settings: &ConversationSettings) -> Effect {
        match (self.step, self.draft.as_mut()) {
            (ConversationStep::ChoosingTime, Some(draft)) => {
                match parse_local_time(text, settings.utc_offset) {
                    Ok(at) => {
                        draft.scheduled_at = Some(at);
                        self.step = ConversationStep::EnteringText;
                        Effect::Reply(Prompt::AskText)
                    }
                    Err(_) => {
                        self.reset();
                        Effect::Reply(Prompt::InvalidTime)
                    }
                }
            }
            (ConversationStep::EnteringText, Some(draft)) if !text.trim().is_empty() => {
                draft.message = Some(text.to_string());
                self.step = ConversationStep::ChoosingColour;
                Effect::Reply(Prompt::AskColour)
            }
            _ => {
                self.reset();
                Effect::Reply(Prompt::StartWithNewReminder)
            }
        }
    }

    fn handle_choice(&mut self, data: &str, settings: &ConversationSettings) -> Effect {
        let data = data.trim_start_matches('\u{c}');
        match (self.step, self.draft.as_mut()) {
            (ConversationStep::ChoosingColour, Some(draft)) => {
                let colour = data
                    .strip_prefix("colour_")
                    .and_then(|name| name.parse::<Colour>().ok());
                if let Some(colour) = colour {
                    draft.colour = colour;
                    self.step = ConversationStep::ChoosingMode;
                    Effect::Reply(Prompt::AskMode)
                } else {
                    self.reset();
                    Effect::Reply(Prompt::InvalidColour)
                }
            }
            (ConversationStep::ChoosingMode, Some(draft)) => {
                let mode = data
                    .strip_prefix("effect_")
                    .and_then(|name| name.parse::<Mode>().ok());
                if let Some(mode) = mode {
                    draft.mode = mode;
                    let finished = draft.clone();
                    self.reset();
                    Effect::CreateReminder(finished)
                } else {
                    self.reset();
                    Effect::Reply(Prompt::InvalidMode)
                }
            }
            (ConversationStep::Listing { offset }, _) => {
                self.handle_listing_choice(data, offset, settings.page_size)
            }
            _ => {
                self.reset();
                Effect::Reply(Prompt::TryAgain)
            }
        }
    }

    fn handle_listing_choice(&mut self, data: &str, offset: u32, page_size: u32) -> Effect {
        if let Some(raw_id) = data.strip_prefix("delete_reminder:") {
            return match raw_id.parse::<ReminderId>() {
                Ok(id) => Effect::DeleteReminder(id),
                Err(_) => {
                    self.reset();
                    Effect::Reply(Prompt::StartWithNewReminder)
                }
            };
        }

        let offset = match data {
            "pagination_prev" => offset.checked_sub(page_size).unwrap_or(offset),
            "pagination_next" => offset.saturating_add(page_size),
            _ => offset,
        };
        self.step = ConversationStep::Listing { offset };
        Effect::ListReminders {
            offset,
            limit: page_size,
        }
    }
}

/// Parse `YYYY-MM-DD HH:MM` at `offset` and normalise it to UTC.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTime`] when the text does not match
/// [`TIME_FORMAT`].
pub fn parse_local_time(text: &str, offset: FixedOffset) -> Result<Timestamp, ValidationError> {
    let text = text.trim();
    let naive = NaiveDateTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(text.to_string()))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.to_utc())
        .ok_or_else(|| ValidationError::InvalidTime(text.to_string()))
}
