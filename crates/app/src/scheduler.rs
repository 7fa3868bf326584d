//! Reminder scheduler — the supervised polling loop that delivers due
//! reminders.
//!
//! Every `cycle_duration` the loop spawns one processing cycle:
//!
//! 1. drain every task due at the current Unix second,
//! 2. resolve each task against the reminder store,
//! 3. make the device glow for each resolved reminder, in drain order,
//! 4. delete the delivered reminder.
//!
//! Cycles run as independently tracked tasks. A failing cycle is logged and
//! the loop carries on with the next tick. [`ReminderScheduler::stop`] stops
//! the timer, lets in-flight cycles finish, and reports the first error among
//! the cycles it had to wait for.
//!
//! Delivery is at-most-once per drain: a task removed by a successful drain is
//! never put back, whatever happens to the rest of the cycle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use glowminder_domain::error::{GlowError, NotFoundError};
use glowminder_domain::id::ReminderId;
use glowminder_domain::reminder::Reminder;

use crate::ports::{Clock, DeviceClient, ReminderRepository, TaskQueue};

/// What a cycle does with a task whose reminder no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Log and drop the task, keep processing the rest.
    #[default]
    Skip,
    /// Fail the whole cycle with [`GlowError::NotFound`].
    #[serde(rename = "abort")]
    AbortCycle,
}

/// Whether a tick may start a cycle while the previous one is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    #[default]
    Allow,
    /// Skip ticks while a cycle is in flight.
    SingleFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub cycle_duration: Duration,
    pub not_found_policy: NotFoundPolicy,
    pub overlap_policy: OverlapPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_duration: Duration::from_secs(60),
            not_found_policy: NotFoundPolicy::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Stopping,
}

/// Counters for one processing cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tasks removed from the queue.
    pub drained: usize,
    /// Reminders delivered and deleted.
    pub delivered: usize,
    /// Tasks dropped because their reminder is gone or was rescheduled.
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("cycle duration must be greater than zero")]
    ZeroCycleDuration,

    /// A cycle that was in flight when stop was requested failed.
    #[error("reminder cycle failed")]
    Cycle(#[source] GlowError),
}

/// Periodic delivery engine over the four ports.
pub struct ReminderScheduler<Q, R, D, C> {
    cycle: Arc<Cycle<Q, R, D, C>>,
    config: SchedulerConfig,
    lifecycle: Mutex<Lifecycle>,
}

enum Lifecycle {
    Stopped,
    Running(Supervisor),
    Stopping,
}

struct Supervisor {
    cancel: CancellationToken,
    tracker: TaskTracker,
    first_error: Arc<Mutex<Option<GlowError>>>,
}

impl<Q, R, D, C> ReminderScheduler<Q, R, D, C>
where
    Q: TaskQueue + 'static,
    R: ReminderRepository + 'static,
    D: DeviceClient + 'static,
    C: Clock + 'static,
{
    pub fn new(queue: Q, repo: R, device: D, clock: C, config: SchedulerConfig) -> Self {
        Self {
            cycle: Arc::new(Cycle {
                queue,
                repo,
                device,
                clock,
                not_found_policy: config.not_found_policy,
            }),
            config,
            lifecycle: Mutex::new(Lifecycle::Stopped),
        }
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        match *self.lock() {
            Lifecycle::Stopped => SchedulerState::Stopped,
            Lifecycle::Running(_) => SchedulerState::Running,
            Lifecycle::Stopping => SchedulerState::Stopping,
        }
    }

    /// Launch the timer loop on the current tokio runtime and return
    /// immediately. The first cycle runs one `cycle_duration` from now.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] unless the scheduler is
    /// stopped, or [`SchedulerError::ZeroCycleDuration`].
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.config.cycle_duration.is_zero() {
            return Err(SchedulerError::ZeroCycleDuration);
        }

        let mut lifecycle = self.lock();
        if !matches!(*lifecycle, Lifecycle::Stopped) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let supervisor = Supervisor {
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
            first_error: Arc::new(Mutex::new(None)),
        };
        let ticker = Ticker {
            cycle: Arc::clone(&self.cycle),
            cancel: supervisor.cancel.clone(),
            tracker: supervisor.tracker.clone(),
            first_error: Arc::clone(&supervisor.first_error),
            period: self.config.cycle_duration,
            overlap_policy: self.config.overlap_policy,
            in_flight: Arc::new(AtomicBool::new(false)),
        };
        supervisor.tracker.spawn(ticker.run());
        *lifecycle = Lifecycle::Running(supervisor);

        tracing::info!(
            cycle_duration = ?self.config.cycle_duration,
            not_found_policy = ?self.config.not_found_policy,
            overlap_policy = ?self.config.overlap_policy,
            "reminder scheduler started"
        );
        Ok(())
    }

    /// Stop the timer loop and wait for every in-flight cycle.
    ///
    /// Calling this while stopped (or while another stop is in progress) is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Cycle`] with the first error raised by a
    /// cycle that was still running when stop was requested. Failures of
    /// cycles that finished earlier were already logged and are not repeated.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let supervisor = {
            let mut lifecycle = self.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopping) {
                Lifecycle::Running(supervisor) => supervisor,
                other => {
                    *lifecycle = other;
                    return Ok(());
                }
            }
        };

        tracing::info!("stopping reminder scheduler");
        supervisor.cancel.cancel();
        supervisor.tracker.close();
        supervisor.tracker.wait().await;
        *self.lock() = Lifecycle::Stopped;

        let first_error = supervisor
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::info!(failed = first_error.is_some(), "reminder scheduler stopped");
        first_error.map_or(Ok(()), |err| Err(SchedulerError::Cycle(err)))
    }

    /// Run one processing cycle now, outside of the timer loop.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the cycle: a queue or store failure,
    /// [`GlowError::NotFound`] under [`NotFoundPolicy::AbortCycle`], or
    /// [`GlowError::DeliveryFailed`].
    pub async fn process_due_tasks(&self) -> Result<CycleReport, GlowError> {
        self.cycle.process_due_tasks().await
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Q, R, D, C> Drop for ReminderScheduler<Q, R, D, C> {
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Lifecycle::Running(supervisor) = lifecycle {
            supervisor.cancel.cancel();
        }
    }
}

struct Cycle<Q, R, D, C> {
    queue: Q,
    repo: R,
    device: D,
    clock: C,
    not_found_policy: NotFoundPolicy,
}

impl<Q, R, D, C> Cycle<Q, R, D, C>
where
    Q: TaskQueue,
    R: ReminderRepository,
    D: DeviceClient,
    C: Clock,
{
    async fn process_due_tasks(&self) -> Result<CycleReport, GlowError> {
        let cutoff = self.clock.now_unix();
        tracing::debug!(cutoff, "reminder cycle started");

        let tasks = self.queue.drain_due(cutoff).await?;
        let mut report = CycleReport {
            drained: tasks.len(),
            ..CycleReport::default()
        };

        let mut due: Vec<Reminder> = Vec::with_capacity(tasks.len());
        let mut seen: HashSet<ReminderId> = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if !seen.insert(task.id) {
                tracing::debug!(reminder_id = %task.id, "dropping duplicate task");
                report.skipped += 1;
                continue;
            }
            let found = match self.repo.get_by_id(task.id).await {
                Ok(found) => found,
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            };
            match found {
                Some(reminder) if reminder.is_scheduled_by(&task) => due.push(reminder),
                Some(reminder) => {
                    tracing::debug!(
                        reminder_id = %reminder.id,
                        task_at = %task.scheduled_at,
                        scheduled_at = %reminder.scheduled_at,
                        "dropping stale task"
                    );
                    report.skipped += 1;
                }
                None => match self.not_found_policy {
                    NotFoundPolicy::Skip => {
                        tracing::warn!(reminder_id = %task.id, "task points at a missing reminder");
                        report.skipped += 1;
                    }
                    NotFoundPolicy::AbortCycle => {
                        return Err(NotFoundError {
                            entity: "Reminder",
                            id: task.id.to_string(),
                        }
                        .into());
                    }
                },
            }
        }

        for reminder in due {
            self.device.glow(reminder.glow_command()?).await?;
            self.repo.delete(reminder.id).await?;
            tracing::debug!(reminder_id = %reminder.id, owner_id = %reminder.owner_id, "reminder delivered");
            report.delivered += 1;
        }

        if report.drained > 0 {
            tracing::info!(
                drained = report.drained,
                delivered = report.delivered,
                skipped = report.skipped,
                "reminder cycle finished"
            );
        } else {
            tracing::debug!("reminder cycle finished, nothing due");
        }
        Ok(report)
    }
}

/// The timer loop and everything it needs to spawn cycles.
struct Ticker<Q, R, D, C> {
    cycle: Arc<Cycle<Q, R, D, C>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    first_error: Arc<Mutex<Option<GlowError>>>,
    period: Duration,
    overlap_policy: OverlapPolicy,
    in_flight: Arc<AtomicBool>,
}

impl<Q, R, D, C> Ticker<Q, R, D, C>
where
    Q: TaskQueue + 'static,
    R: ReminderRepository + 'static,
    D: DeviceClient + 'static,
    C: Clock + 'static,
{
    async fn run(self) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = interval.tick() => self.spawn_cycle(),
            }
        }
        tracing::debug!("reminder scheduler loop exited");
    }

    fn spawn_cycle(&self) {
        let guard = match self.overlap_policy {
            OverlapPolicy::Allow => None,
            OverlapPolicy::SingleFlight => {
                if let Some(guard) = InFlight::acquire(&self.in_flight) {
                    Some(guard)
                } else {
                    tracing::debug!("previous cycle still running, skipping tick");
                    return;
                }
            }
        };

        let cycle = Arc::clone(&self.cycle);
        let cancel = self.cancel.clone();
        let first_error = Arc::clone(&self.first_error);
        self.tracker.spawn(async move {
            let _guard = guard;
            if let Err(err) = cycle.process_due_tasks().await {
                tracing::error!(error = %err, "reminder cycle failed");
                if cancel.is_cancelled() {
                    let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
            }
        });
    }
}

/// Marks a cycle as running until dropped.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::services::reminder_service::ReminderService;
    use crate::task_queue::InMemoryTaskQueue;
    use crate::test_support::{InMemoryReminderRepo, RecordingDevice, ScriptedQueue, reminder_at};
    use glowminder_domain::glow::{Colour, GlowCommand, Mode};
    use glowminder_domain::id::ReminderId;
    use glowminder_domain::reminder::ReminderPatch;
    use glowminder_domain::task::ReminderTask;
    use glowminder_domain::time::from_unix;

    const START: i64 = 1_000_000;

    type TestScheduler = ReminderScheduler<
        Arc<InMemoryTaskQueue>,
        Arc<InMemoryReminderRepo>,
        Arc<RecordingDevice>,
        ManualClock,
    >;

    struct Harness {
        scheduler: TestScheduler,
        service: ReminderService<Arc<InMemoryReminderRepo>, Arc<InMemoryTaskQueue>>,
        repo: Arc<InMemoryReminderRepo>,
        queue: Arc<InMemoryTaskQueue>,
        device: Arc<RecordingDevice>,
        clock: ManualClock,
    }

    fn harness_with(device: RecordingDevice, config: SchedulerConfig) -> Harness {
        let repo = Arc::new(InMemoryReminderRepo::default());
        let queue = Arc::new(InMemoryTaskQueue::new());
        let device = Arc::new(device);
        let clock = ManualClock::new(from_unix(START));
        let scheduler = ReminderScheduler::new(
            Arc::clone(&queue),
            Arc::clone(&repo),
            Arc::clone(&device),
            clock.clone(),
            config,
        );
        Harness {
            scheduler,
            service: ReminderService::new(Arc::clone(&repo), Arc::clone(&queue)),
            repo,
            queue,
            device,
            clock,
        }
    }

    fn harness(device: RecordingDevice) -> Harness {
        harness_with(device, SchedulerConfig::default())
    }

    fn red_static() -> GlowCommand {
        GlowCommand::new(Colour::Red, Mode::Static).unwrap()
    }

    async fn create_due(h: &Harness) -> Reminder {
        h.service
            .create_reminder(reminder_at(42, h.clock.now_unix()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn should_deliver_and_delete_reminder_when_due() {
        let h = harness(RecordingDevice::default());
        let reminder = create_due(&h).await;
        h.clock.advance(chrono::Duration::seconds(60));

        let report = h.scheduler.process_due_tasks().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                drained: 1,
                delivered: 1,
                skipped: 0
            }
        );
        assert_eq!(h.device.calls(), vec![red_static()]);
        assert!(!h.repo.contains(reminder.id));
        assert!(h.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn should_report_nothing_when_queue_is_empty() {
        let h = harness(RecordingDevice::default());
        let report = h.scheduler.process_due_tasks().await.unwrap();
        assert_eq!(report, CycleReport::default());
        assert!(h.device.calls().is_empty());
    }

    #[tokio::test]
    async fn should_leave_future_reminders_alone() {
        let h = harness(RecordingDevice::default());
        h.service
            .create_reminder(reminder_at(42, START + 1))
            .await
            .unwrap();

        let report = h.scheduler.process_due_tasks().await.unwrap();

        assert_eq!(report.drained, 0);
        assert_eq!(h.queue.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_deliver_in_schedule_order() {
        let h = harness(RecordingDevice::default());
        let late = reminder_at(42, START - 10);
        let mut early = reminder_at(42, START - 20);
        early.colour = Colour::Blue;
        h.service.create_reminder(late).await.unwrap();
        h.service.create_reminder(early).await.unwrap();

        h.scheduler.process_due_tasks().await.unwrap();

        let colours: Vec<Colour> = h.device.calls().iter().map(|c| c.colour()).collect();
        assert_eq!(colours, vec![Colour::Blue, Colour::Red]);
    }

    #[tokio::test]
    async fn should_keep_reminder_when_device_fails() {
        let h = harness(RecordingDevice::failing());
        let reminder = create_due(&h).await;

        let result = h.scheduler.process_due_tasks().await;

        assert!(matches!(result, Err(GlowError::DeliveryFailed(_))));
        assert!(h.repo.contains(reminder.id));
        assert!(h.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn should_skip_missing_reminder_when_policy_is_skip() {
        let h = harness(RecordingDevice::default());
        h.queue
            .enqueue(ReminderTask::new(ReminderId::new(), from_unix(START - 5)))
            .await
            .unwrap();
        create_due(&h).await;

        let report = h.scheduler.process_due_tasks().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                drained: 2,
                delivered: 1,
                skipped: 1
            }
        );
        assert_eq!(h.device.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_abort_cycle_on_missing_reminder_when_policy_is_abort() {
        let h = harness_with(
            RecordingDevice::default(),
            SchedulerConfig {
                not_found_policy: NotFoundPolicy::AbortCycle,
                ..SchedulerConfig::default()
            },
        );
        h.queue
            .enqueue(ReminderTask::new(ReminderId::new(), from_unix(START - 5)))
            .await
            .unwrap();
        let reminder = create_due(&h).await;

        let result = h.scheduler.process_due_tasks().await;

        assert!(matches!(result, Err(GlowError::NotFound(_))));
        assert!(h.device.calls().is_empty());
        assert!(h.repo.contains(reminder.id));
        assert!(h.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn should_drop_stale_task_after_reschedule() {
        let h = harness(RecordingDevice::default());
        let reminder = create_due(&h).await;
        let mut patch = ReminderPatch::new(reminder.id, from_unix(START));
        patch.scheduled_at = Some(from_unix(START + 3_600));
        h.service.update_reminder(patch).await.unwrap();

        let report = h.scheduler.process_due_tasks().await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.delivered, 0);
        assert!(h.repo.contains(reminder.id));

        h.clock.advance(chrono::Duration::seconds(3_600));
        let report = h.scheduler.process_due_tasks().await.unwrap();
        assert_eq!(report.delivered, 1);
        assert!(!h.repo.contains(reminder.id));
    }

    #[tokio::test]
    async fn should_glow_once_when_update_keeps_same_instant() {
        let h = harness_with(
            RecordingDevice::default(),
            SchedulerConfig {
                not_found_policy: NotFoundPolicy::AbortCycle,
                ..SchedulerConfig::default()
            },
        );
        let reminder = create_due(&h).await;
        let mut patch = ReminderPatch::new(reminder.id, from_unix(START));
        patch.scheduled_at = Some(reminder.scheduled_at);
        h.service.update_reminder(patch).await.unwrap();

        let report = h.scheduler.process_due_tasks().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                drained: 1,
                delivered: 1,
                skipped: 0
            }
        );
        assert_eq!(h.device.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_glow_once_when_queue_returns_duplicate_tasks() {
        let repo = Arc::new(InMemoryReminderRepo::default());
        let reminder = reminder_at(42, START);
        repo.create(reminder.clone()).await.unwrap();
        let task = reminder.task();
        let queue = Arc::new(ScriptedQueue::with_batch(vec![task, task]));
        let device = Arc::new(RecordingDevice::default());
        let scheduler = ReminderScheduler::new(
            queue,
            Arc::clone(&repo),
            Arc::clone(&device),
            ManualClock::new(from_unix(START)),
            SchedulerConfig {
                not_found_policy: NotFoundPolicy::AbortCycle,
                ..SchedulerConfig::default()
            },
        );

        let report = scheduler.process_due_tasks().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                drained: 2,
                delivered: 1,
                skipped: 1
            }
        );
        assert_eq!(device.calls(), vec![red_static()]);
        assert!(!repo.contains(reminder.id));
    }

    #[tokio::test]
    async fn should_abort_cycle_when_store_is_unavailable() {
        let h = harness(RecordingDevice::default());
        create_due(&h).await;
        h.repo.fail_reads(true);

        let result = h.scheduler.process_due_tasks().await;

        assert!(matches!(result, Err(GlowError::StoreUnavailable(_))));
        assert!(h.device.calls().is_empty());
        assert!(h.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn should_surface_delete_failure_after_delivery() {
        let h = harness(RecordingDevice::default());
        create_due(&h).await;
        h.repo.fail_writes(true);

        let result = h.scheduler.process_due_tasks().await;

        assert!(matches!(result, Err(GlowError::StoreUnavailable(_))));
        assert_eq!(h.device.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_cycle_on_each_tick() {
        let h = harness(RecordingDevice::default());
        create_due(&h).await;
        h.scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(h.device.calls().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.device.calls().len(), 1);

        create_due(&h).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.device.calls().len(), 2);

        h.scheduler.stop().await.unwrap();
        assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_second_start() {
        let h = harness(RecordingDevice::default());
        h.scheduler.start().unwrap();
        assert_eq!(h.scheduler.state(), SchedulerState::Running);

        let result = h.scheduler.start();

        assert!(matches!(result, Err(SchedulerError::AlreadyRunning)));
        h.scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_restart_after_stop() {
        let h = harness(RecordingDevice::default());
        h.scheduler.start().unwrap();
        h.scheduler.stop().await.unwrap();

        create_due(&h).await;
        h.scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        h.scheduler.stop().await.unwrap();

        assert_eq!(h.device.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_treat_stop_when_stopped_as_noop() {
        let h = harness(RecordingDevice::default());
        h.scheduler.stop().await.unwrap();
        assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn should_reject_zero_cycle_duration() {
        let h = harness_with(
            RecordingDevice::default(),
            SchedulerConfig {
                cycle_duration: Duration::ZERO,
                ..SchedulerConfig::default()
            },
        );
        assert!(matches!(
            h.scheduler.start(),
            Err(SchedulerError::ZeroCycleDuration)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_in_flight_cycle_when_stopping() {
        let h = harness(RecordingDevice::slow(Duration::from_secs(30)));
        let reminder = create_due(&h).await;
        h.scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(h.device.calls().is_empty());

        let stop_requested = Instant::now();
        h.scheduler.stop().await.unwrap();

        assert!(stop_requested.elapsed() >= Duration::from_secs(29));
        assert_eq!(h.device.calls().len(), 1);
        assert!(!h.repo.contains(reminder.id));
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_error_of_cycle_interrupted_by_stop() {
        let h = harness(RecordingDevice::slow(Duration::from_secs(30)).and_failing());
        create_due(&h).await;
        h.scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;

        let result = h.scheduler.stop().await;

        assert!(matches!(
            result,
            Err(SchedulerError::Cycle(GlowError::DeliveryFailed(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_running_after_failed_cycle() {
        let h = harness(RecordingDevice::failing());
        create_due(&h).await;
        h.scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(h.device.calls().len(), 1);

        create_due(&h).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.device.calls().len(), 2);

        h.scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_overlap_cycles_by_default() {
        let h = harness(RecordingDevice::slow(Duration::from_secs(90)));
        create_due(&h).await;
        h.scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        create_due(&h).await;
        tokio::time::sleep(Duration::from_secs(139)).await;
        h.scheduler.stop().await.unwrap();

        assert_eq!(h.device.calls().len(), 2);
        assert_eq!(h.device.max_concurrent(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_ticks_while_cycle_runs_when_single_flight() {
        let h = harness_with(
            RecordingDevice::slow(Duration::from_secs(90)),
            SchedulerConfig {
                overlap_policy: OverlapPolicy::SingleFlight,
                ..SchedulerConfig::default()
            },
        );
        create_due(&h).await;
        h.scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        create_due(&h).await;
        tokio::time::sleep(Duration::from_secs(139)).await;
        h.scheduler.stop().await.unwrap();

        assert_eq!(h.device.calls().len(), 2);
        assert_eq!(h.device.max_concurrent(), 1);
    }
}
