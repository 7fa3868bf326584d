//! In-process task queue.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use glowminder_domain::error::GlowError;
use glowminder_domain::task::ReminderTask;

use crate::ports::TaskQueue;

/// [`TaskQueue`] kept in memory, ordered by `(score, insertion sequence)`.
///
/// A reminder is queued at most once per score; enqueueing it again at the
/// same second is a no-op.
///
/// Every operation runs under one lock, so a drain is a single critical
/// section. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    inner: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    next_seq: u64,
    by_score: BTreeMap<(i64, u64), ReminderTask>,
}

impl InMemoryTaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskQueue for InMemoryTaskQueue {
    fn enqueue(&self, task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send {
        {
            let mut entries = self.lock();
            let score = task.score();
            let queued = entries
                .by_score
                .range((score, 0)..=(score, u64::MAX))
                .any(|(_, queued)| queued.id == task.id);
            if !queued {
                let seq = entries.next_seq;
                entries.next_seq += 1;
                entries.by_score.insert((score, seq), task);
            }
        }
        async { Ok(()) }
    }

    fn drain_due(
        &self,
        cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send {
        let due = {
            let mut entries = self.lock();
            let first_later = entries
                .by_score
                .iter()
                .find(|(_, task)| !task.is_due(cutoff))
                .map(|(key, _)| *key);
            let later = match first_later {
                Some(key) => entries.by_score.split_off(&key),
                None => BTreeMap::new(),
            };
            std::mem::replace(&mut entries.by_score, later)
        };
        let tasks: Vec<ReminderTask> = due.into_values().collect();
        async { Ok(tasks) }
    }

    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send {
        let len = self.lock().by_score.len();
        async move { Ok(len) }
    }
}
