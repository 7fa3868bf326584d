//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod conversation_service;
pub mod reminder_service;
