//! # glowminder-app
//!
//! Application layer — use-cases, the scheduling engine and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ReminderRepository` — CRUD for reminder records
//!   - `TaskQueue` — time-ordered queue with an atomic "drain everything due"
//!   - `DeviceClient` — make a lamp glow
//!   - `Clock` — the current instant
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ReminderService` — create, get, list, update, delete
//!   - `ConversationService` — step-by-step reminder drafting for chat front-ends
//!   - `ReminderScheduler` — supervised polling loop delivering due reminders
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (`InMemoryTaskQueue`, `SystemClock`, `ManualClock`)
//!
//! ## Dependency rule
//! Depends on `glowminder-domain` only (plus `tokio` / `tokio-util` for the
//! runtime primitives). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod clock;
pub mod ports;
pub mod scheduler;
pub mod services;
pub mod task_queue;

#[cfg(test)]
mod test_support;
