//! # glowminder-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `ReminderRepository` and `TaskQueue` from `glowminder-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! Reminders and tasks live in two tables with no foreign key between them,
//! mirroring the two independent stores of the scheduling model.
//!
//! ## Dependency rule
//! Depends on `glowminder-app` (for port traits) and `glowminder-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

mod error;
mod pool;
mod reminder_repo;
mod task_queue;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reminder_repo::SqliteReminderRepository;
pub use task_queue::SqliteTaskQueue;
