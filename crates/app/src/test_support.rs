//! Port fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use glowminder_domain::error::{ConflictError, DeliveryError, GlowError, NotFoundError};
use glowminder_domain::glow::{Colour, GlowCommand, Mode};
use glowminder_domain::id::{OwnerId, ReminderId};
use glowminder_domain::reminder::{Reminder, ReminderFilter, ReminderPatch};
use glowminder_domain::task::ReminderTask;
use glowminder_domain::time::from_unix;

use crate::ports::{DeviceClient, ReminderRepository, TaskQueue};

pub fn reminder_at(owner: i64, secs: i64) -> Reminder {
    Reminder::builder()
        .owner_id(owner)
        .message("water the plants")
        .colour(Colour::Red)
        .mode(Mode::Static)
        .scheduled_at(from_unix(secs))
        .created_at(from_unix(0))
        .build()
        .unwrap()
}

fn unavailable() -> GlowError {
    GlowError::store_unavailable(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "store is down",
    ))
}

fn not_found(id: ReminderId) -> GlowError {
    NotFoundError {
        entity: "Reminder",
        id: id.to_string(),
    }
    .into()
}

#[derive(Default)]
pub struct InMemoryReminderRepo {
    store: Mutex<HashMap<ReminderId, Reminder>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    slow_listing: Mutex<Option<(OwnerId, Duration)>>,
}

impl InMemoryReminderRepo {
    pub fn contains(&self, id: ReminderId) -> bool {
        self.store.lock().unwrap().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make listings filtered on `owner` take `delay`.
    pub fn slow_listing_for(&self, owner: OwnerId, delay: Duration) {
        *self.slow_listing.lock().unwrap() = Some((owner, delay));
    }

    fn write_guard(&self) -> Result<(), GlowError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

impl ReminderRepository for InMemoryReminderRepo {
    fn create(
        &self,
        reminder: Reminder,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        let result = self.write_guard().and_then(|()| {
            let mut store = self.store.lock().unwrap();
            if store.contains_key(&reminder.id) {
                return Err(ConflictError {
                    entity: "Reminder",
                    id: reminder.id.to_string(),
                }
                .into());
            }
            store.insert(reminder.id, reminder.clone());
            Ok(reminder)
        });
        async { result }
    }

    fn get_by_id(
        &self,
        id: ReminderId,
    ) -> impl Future<Output = Result<Option<Reminder>, GlowError>> + Send {
        let result = if self.fail_reads.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(self.store.lock().unwrap().get(&id).cloned())
        };
        async { result }
    }

    fn get_many(
        &self,
        filter: ReminderFilter,
    ) -> impl Future<Output = Result<Vec<Reminder>, GlowError>> + Send {
        let mut all: Vec<Reminder> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.owner_id.is_none_or(|owner| r.owner_id == owner))
            .cloned()
            .collect();
        all.sort_by_key(|r| r.scheduled_at);
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        let page: Vec<Reminder> = all.into_iter().skip(offset).take(limit).collect();
        let delay = match *self.slow_listing.lock().unwrap() {
            Some((owner, delay)) if filter.owner_id == Some(owner) => delay,
            _ => Duration::ZERO,
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(page)
        }
    }

    fn update(
        &self,
        patch: ReminderPatch,
    ) -> impl Future<Output = Result<Reminder, GlowError>> + Send {
        let result = self.write_guard().and_then(|()| {
            let mut store = self.store.lock().unwrap();
            let reminder = store.get_mut(&patch.id).ok_or_else(|| not_found(patch.id))?;
            patch.apply(reminder);
            Ok(reminder.clone())
        });
        async { result }
    }

    fn delete(&self, id: ReminderId) -> impl Future<Output = Result<(), GlowError>> + Send {
        let result = self.write_guard().and_then(|()| {
            self.store
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found(id))
        });
        async { result }
    }
}

/// A queue whose backing store is always down.
pub struct BrokenQueue;

impl TaskQueue for BrokenQueue {
    fn enqueue(&self, _task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send {
        async { Err(unavailable()) }
    }

    fn drain_due(
        &self,
        _cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send {
        async { Err(unavailable()) }
    }

    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send {
        async { Err(unavailable()) }
    }
}

/// A queue that hands back a fixed batch on the first drain, duplicates included.
#[derive(Default)]
pub struct ScriptedQueue {
    batch: Mutex<Vec<ReminderTask>>,
}

impl ScriptedQueue {
    pub fn with_batch(batch: Vec<ReminderTask>) -> Self {
        Self {
            batch: Mutex::new(batch),
        }
    }
}

impl TaskQueue for ScriptedQueue {
    fn enqueue(&self, task: ReminderTask) -> impl Future<Output = Result<(), GlowError>> + Send {
        self.batch.lock().unwrap().push(task);
        async { Ok(()) }
    }

    fn drain_due(
        &self,
        _cutoff: i64,
    ) -> impl Future<Output = Result<Vec<ReminderTask>, GlowError>> + Send {
        let batch = std::mem::take(&mut *self.batch.lock().unwrap());
        async { Ok(batch) }
    }

    fn len(&self) -> impl Future<Output = Result<usize, GlowError>> + Send {
        let len = self.batch.lock().unwrap().len();
        async move { Ok(len) }
    }
}

/// Records every glow, optionally failing or taking its time.
#[derive(Default)]
pub struct RecordingDevice {
    calls: Mutex<Vec<GlowCommand>>,
    fail: AtomicBool,
    delay: Mutex<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingDevice {
    pub fn failing() -> Self {
        let device = Self::default();
        device.fail.store(true, Ordering::SeqCst);
        device
    }

    pub fn slow(delay: Duration) -> Self {
        let device = Self::default();
        *device.delay.lock().unwrap() = delay;
        device
    }

    #[must_use]
    pub fn and_failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<GlowCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl DeviceClient for RecordingDevice {
    async fn glow(&self, command: GlowCommand) -> Result<(), GlowError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push(command);
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected { status: 503 }.into());
        }
        Ok(())
    }
}
