//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod device_client;
pub mod reminder_repo;
pub mod task_queue;

pub use clock::Clock;
pub use device_client::DeviceClient;
pub use reminder_repo::ReminderRepository;
pub use task_queue::TaskQueue;
