//! Error types returned by the broadcaster API.
//!
//! This module defines a single enum, [`BroadcastError`], covering every failure a caller
//! of [`Broadcaster`](crate::Broadcaster) or [`Bus`](crate::Bus) can observe.
//!
//! All errors are returned synchronously to the caller. Background tasks (the fan-out loop
//! and the per-subscriber drain tasks) never surface errors; they log instead.
//!
//! Like every error enum in this crate, it provides helper methods (`as_label`, `as_message`)
//! for logging/metrics.

use thiserror::Error;

use crate::subscribers::SubscriberId;

/// # Errors produced by the broadcaster.
///
/// None of these are retried internally; propagation stops at the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// The ingestion source has terminated; the broadcaster accepts no further registry changes.
    #[error("broadcaster expired")]
    Expired,

    /// The subscriber is not registered (never was, or already removed).
    #[error("subscription not found: {id}")]
    NotFound {
        /// Identity of the subscriber that was looked up.
        id: SubscriberId,
    },

    /// The subscription carries no processing callback.
    #[error("subscription has no processing callback")]
    InvalidCallback,

    /// The reading end of the ingestion channel is gone.
    #[error("ingestion channel closed")]
    IngestClosed,
}

impl BroadcastError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanout::BroadcastError;
    ///
    /// assert_eq!(BroadcastError::Expired.as_label(), "broadcaster_expired");
    /// assert_eq!(BroadcastError::InvalidCallback.as_label(), "invalid_callback");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BroadcastError::Expired => "broadcaster_expired",
            BroadcastError::NotFound { .. } => "subscriber_not_found",
            BroadcastError::InvalidCallback => "invalid_callback",
            BroadcastError::IngestClosed => "ingest_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BroadcastError::Expired => "broadcaster expired; ingestion source terminated".to_string(),
            BroadcastError::NotFound { id } => format!("subscriber {id} is not registered"),
            BroadcastError::InvalidCallback => "nil processing callback not allowed".to_string(),
            BroadcastError::IngestClosed => "ingestion reader dropped".to_string(),
        }
    }

    /// Indicates whether the broadcaster behind this error is gone for good.
    ///
    /// Returns `true` for [`BroadcastError::Expired`] and [`BroadcastError::IngestClosed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, BroadcastError::Expired | BroadcastError::IngestClosed)
    }
}
