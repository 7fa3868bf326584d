//! # glowminder-domain
//!
//! Pure domain model for the glowminder reminder system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Reminders** (a message that makes a lamp glow at a given instant)
//! - Define **Reminder tasks** (lightweight time-ordered queue entries)
//! - Define **Glow commands** (the colour + mode pair sent to a device)
//! - Define the **conversation** draft state machine used by chat front-ends
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod conversation;
pub mod glow;
pub mod reminder;
pub mod task;
