//! # Events flowing from cluster watchers to subscribers.
//!
//! The [`EventKind`] enum tags events by the resource change they describe:
//! - **Namespace events**: namespace created/deleted
//! - **Pipeline resource events**: pipelines, tasks, pipeline resources, runs (created/updated/deleted)
//! - **Log events**: log lines streamed from running steps
//!
//! The [`Event`] struct carries the kind, an opaque payload and ordering metadata.
//! The broadcaster never interprets either; both are for the consumers.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases monotonically
//! in construction order.
//!
//! ## Example
//! ```rust
//! use fanout::{Event, EventKind};
//!
//! #[derive(Debug, PartialEq)]
//! struct PipelineRun { name: String }
//!
//! let ev = Event::new(EventKind::PipelineRunCreated)
//!     .with_payload(PipelineRun { name: "build-42".into() });
//!
//! assert_eq!(ev.kind, EventKind::PipelineRunCreated);
//! assert_eq!(ev.kind.as_label(), "PipelineRunCreated");
//! assert_eq!(ev.payload_as::<PipelineRun>().map(|r| r.name.as_str()), Some("build-42"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque, shareable event payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Classification of resource-change events.
///
/// Purely informational; fan-out treats every kind the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Log output from a running step.
    Log,

    // === Namespaces ===
    NamespaceCreated,
    NamespaceDeleted,

    // === Pipelines ===
    PipelineCreated,
    PipelineUpdated,
    PipelineDeleted,

    // === Tasks ===
    TaskCreated,
    TaskUpdated,
    TaskDeleted,

    // === Pipeline resources ===
    PipelineResourceCreated,
    PipelineResourceUpdated,
    PipelineResourceDeleted,

    // === Pipeline runs ===
    PipelineRunCreated,
    PipelineRunUpdated,
    PipelineRunDeleted,

    // === Task runs ===
    TaskRunCreated,
    TaskRunUpdated,
    TaskRunDeleted,
}

impl EventKind {
    /// Returns the stable message-type name transports put on the wire.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Log => "Log",
            EventKind::NamespaceCreated => "NamespaceCreated",
            EventKind::NamespaceDeleted => "NamespaceDeleted",
            EventKind::PipelineCreated => "PipelineCreated",
            EventKind::PipelineUpdated => "PipelineUpdated",
            EventKind::PipelineDeleted => "PipelineDeleted",
            EventKind::TaskCreated => "TaskCreated",
            EventKind::TaskUpdated => "TaskUpdated",
            EventKind::TaskDeleted => "TaskDeleted",
            EventKind::PipelineResourceCreated => "PipelineResourceCreated",
            EventKind::PipelineResourceUpdated => "PipelineResourceUpdated",
            EventKind::PipelineResourceDeleted => "PipelineResourceDeleted",
            EventKind::PipelineRunCreated => "PipelineRunCreated",
            EventKind::PipelineRunUpdated => "PipelineRunUpdated",
            EventKind::PipelineRunDeleted => "PipelineRunDeleted",
            EventKind::TaskRunCreated => "TaskRunCreated",
            EventKind::TaskRunUpdated => "TaskRunUpdated",
            EventKind::TaskRunDeleted => "TaskRunDeleted",
        }
    }

    /// Returns `true` for the `*Deleted` kinds.
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            EventKind::NamespaceDeleted
                | EventKind::PipelineDeleted
                | EventKind::TaskDeleted
                | EventKind::PipelineResourceDeleted
                | EventKind::PipelineRunDeleted
                | EventKind::TaskRunDeleted
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Resource-change event with an opaque payload.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp (for logs)
/// - `payload`: whatever the producer attached; read it back with [`Event::payload_as`]
///
/// Once handed to the broadcaster an event is wrapped in an `Arc` and shared read-only
/// by every subscriber.
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Opaque payload, if any.
    pub payload: Option<Payload>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            payload: None,
        }
    }

    /// Attaches a payload value.
    #[inline]
    pub fn with_payload<T>(self, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.with_shared_payload(Arc::new(payload))
    }

    /// Attaches an already shared payload without another allocation.
    #[inline]
    pub fn with_shared_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Returns the payload as `T` if one is attached and has that type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Creates a log event carrying `line`.
    #[inline]
    pub fn log(line: impl Into<String>) -> Self {
        Event::new(EventKind::Log).with_payload(line.into())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("at", &self.at)
            .field("kind", &self.kind)
            .field("payload", &self.payload.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}
