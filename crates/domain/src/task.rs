//! Reminder task — a lightweight queue entry pointing at a reminder.

use serde::{Deserialize, Serialize};

use crate::id::ReminderId;
use crate::time::Timestamp;

/// Queue entry: the reminder identifier and the instant it should fire.
///
/// The queue and the reminder store are independent; holding a task does not
/// guarantee the reminder still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderTask {
    pub id: ReminderId,
    pub scheduled_at: Timestamp,
}

impl ReminderTask {
    #[must_use]
    pub fn new(id: ReminderId, scheduled_at: Timestamp) -> Self {
        Self { id, scheduled_at }
    }

    /// Queue score: the scheduled instant in whole Unix seconds.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.scheduled_at.timestamp()
    }

    /// Whether a drain with `cutoff` picks this task up (inclusive).
    #[must_use]
    pub fn is_due(&self, cutoff: i64) -> bool {
        self.score() <= cutoff
    }
}
