//! Common error types used across the workspace.
//!
//! [`GlowError`] is the single error crossing port boundaries. Each adapter
//! keeps its own typed error and converts into it via `From`.

use std::error::Error as StdError;

/// Top-level error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum GlowError {
    /// Malformed input rejected before it reached any store.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The referenced entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// An entity with the same identifier already exists.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The device client reported a failure.
    #[error("delivery failed: {0}")]
    DeliveryFailed(#[from] DeliveryError),

    /// Transient infrastructure failure (connection, timeout, query).
    #[error("store unavailable")]
    StoreUnavailable(#[source] Box<dyn StdError + Send + Sync>),
}

impl GlowError {
    /// Wrap any infrastructure error as [`GlowError::StoreUnavailable`].
    pub fn store_unavailable(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::StoreUnavailable(Box::new(err))
    }

    /// Whether this error means "the entity is absent".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("colour must be chosen")]
    UnsetColour,
    #[error("mode must be chosen")]
    UnsetMode,
    #[error("unknown colour {0:?}")]
    UnknownColour(String),
    #[error("unknown mode {0:?}")]
    UnknownMode(String),
    #[error("invalid time {0:?}, expected YYYY-MM-DD HH:MM")]
    InvalidTime(String),
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An insert collided with an existing identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} already exists")]
pub struct ConflictError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures reported by a device client.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The device answered but refused the command.
    #[error("device rejected the command with status {status}")]
    Rejected { status: u16 },

    /// The device could not be reached.
    #[error("device unreachable")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The device is known to be offline.
    #[error("device is offline")]
    Offline,
}
