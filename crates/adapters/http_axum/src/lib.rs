//! # glowminder-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON REST API** for reminders (`/api/reminders`)
//! - Serve the **conversational endpoint** (`/api/conversations/{owner_id}`)
//!   that chat front-ends forward user input to
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and [`GlowError`](glowminder_domain::error::GlowError)s
//!   into HTTP responses
//!
//! ## Dependency rule
//! Depends on `glowminder-app` (for port traits and services) and
//! `glowminder-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
