//! # Ingestion channel feeding the broadcaster.
//!
//! [`Bus`] is the producer handle of an unbounded [`tokio::sync::mpsc`] channel;
//! [`Ingest`] is its read end, exposed as a [`futures::Stream`] so it can be handed
//! straight to [`Broadcaster::new`](crate::Broadcaster::new).
//!
//! ## Architecture
//! ```text
//! Producers (many):                       Reader (one):
//!   namespace watcher ──┐
//!   pipelinerun watcher ┼──► Bus ──► Ingest ──► fan-out loop (in Broadcaster)
//!   taskrun watcher ────┤   (unbounded mpsc)
//!   log streamer ───────┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; the backlog is unbounded.
//! - **Single reader**: the broadcaster is the only consumer of an [`Ingest`].
//! - **Termination**: dropping every `Bus` clone ends the stream and expires the broadcaster.
//! - **No persistence**: events published before any subscriber exists are dropped by fan-out.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::event::{Event, EventKind, Payload};
use crate::error::BroadcastError;

/// Producer side of the ingestion channel.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Ordered**: events from one producer arrive in publish order.
/// - **Cloneable**: cheap to clone; the channel ends when the last clone is dropped.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: mpsc::UnboundedSender<Event>,
}

impl Bus {
    /// Creates a new ingestion channel.
    ///
    /// ## Example
    /// ```rust
    /// use fanout::{Broadcaster, Bus, EventKind};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (bus, ingest) = Bus::channel();
    /// let broadcaster = Broadcaster::new(ingest);
    ///
    /// bus.publish_kind(EventKind::NamespaceCreated, String::from("default")).unwrap();
    /// drop(bus);
    ///
    /// broadcaster.wait_expired().await;
    /// assert!(broadcaster.expired());
    /// # }
    /// ```
    pub fn channel() -> (Bus, Ingest) {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        (Bus { tx }, Ingest { rx })
    }

    /// Enqueues an event for fan-out.
    ///
    /// Returns [`BroadcastError::IngestClosed`] if the [`Ingest`] end was dropped.
    pub fn publish(&self, ev: Event) -> Result<(), BroadcastError> {
        self.tx.send(ev).map_err(|_| BroadcastError::IngestClosed)
    }

    /// Builds an event of `kind` carrying `payload` and publishes it.
    pub fn publish_kind<T>(&self, kind: EventKind, payload: T) -> Result<(), BroadcastError>
    where
        T: std::any::Any + Send + Sync,
    {
        self.publish(Event::new(kind).with_payload(payload))
    }

    /// Publishes an event whose payload is already shared.
    pub fn publish_shared(&self, kind: EventKind, payload: Payload) -> Result<(), BroadcastError> {
        self.publish(Event::new(kind).with_shared_payload(payload))
    }

    /// Returns `true` once the reading end is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reading end of the ingestion channel.
///
/// Yields events in publish order and ends once every [`Bus`] clone has been dropped.
#[derive(Debug)]
pub struct Ingest {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Stream for Ingest {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.rx.poll_recv(cx)
    }
}
