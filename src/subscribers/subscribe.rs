//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] the processing callback a consumer registers with the broadcaster,
//! and [`Flow`] the verdict it returns for every event.
//!
//! Each subscriber gets:
//! - **Dedicated drain task** (runs independently)
//! - **Per-subscriber queue** (unbounded unless configured otherwise)
//! - **Self-unsubscribe** by returning [`Flow::Unsubscribe`]
//!
//! ## Architecture
//! ```text
//! fan-out loop ──► [subscriber queue] ──► drain task ──► subscriber.on_event()
//!                                                            ├─► Flow::Continue
//!                                                            └─► Flow::Unsubscribe → removed
//! ```
//!
//! ## Rules
//! - A slow subscriber only grows its own queue.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers do not block the ingestion path or each other.
//! - Panics are caught only to remove the subscriber; the drain task exits and is not restarted.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use fanout::{Event, EventKind, Flow, Subscribe};
//!
//! struct DeletionWatcher;
//!
//! #[async_trait]
//! impl Subscribe for DeletionWatcher {
//!     async fn on_event(&self, ev: Arc<Event>) -> Flow {
//!         if ev.kind == EventKind::NamespaceDeleted {
//!             // the namespace this client was looking at is gone
//!             return Flow::Unsubscribe;
//!         }
//!         Flow::Continue
//!     }
//!
//!     fn name(&self) -> &str { "deletion-watcher" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;

/// Verdict of a processing callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the subscription; deliver the next event.
    Continue,
    /// Remove this subscriber; queued events are discarded.
    Unsubscribe,
}

impl Flow {
    /// Returns `true` for [`Flow::Continue`].
    #[inline]
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue)
    }
}

impl From<bool> for Flow {
    /// `true` = continue, `false` = unsubscribe.
    fn from(keep: bool) -> Self {
        if keep { Flow::Continue } else { Flow::Unsubscribe }
    }
}

/// Processing callback of a subscriber.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle transport errors internally; return [`Flow::Unsubscribe`] when the consumer is gone.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's drain task, never from the fan-out loop.
    /// Events are delivered in ingestion order.
    async fn on_event(&self, event: Arc<Event>) -> Flow;

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
