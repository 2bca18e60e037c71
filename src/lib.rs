//! # fanout
//!
//! **fanout** is an event fan-out broadcaster for Rust.
//!
//! It ingests a single ordered stream of events (produced by cluster watchers, log streamers,
//! ...) and redistributes it to any number of independently paced subscribers, such as
//! websocket-connected clients. Every subscriber receives every event once, in order, and a
//! slow subscriber never blocks ingestion or its peers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  namespace   │   │ pipelinerun  │   │   taskrun    │
//!     │   watcher    │   │   watcher    │   │   watcher    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  Bus (unbounded ingestion channel)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │     fan-out loop       │
//!                       │  (in Broadcaster, sole │
//!                       │   ingestion reader)    │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                 Registry (subscribers + expired, one lock)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     [queue 1] [queue 2] [queue N]
//!                         ▼         ▼         ▼
//!                      drain 1   drain 2   drain N
//!                         ▼         ▼         ▼
//!                     sub1.on   sub2.on   subN.on
//!                     _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Broadcaster::new(source) ──► spawn fan-out loop
//!
//! subscribe(handler)   ──► Registry::insert  ──► spawn drain task
//! unsubscribe(&sub)    ──► Registry::remove  ──► terminate signal
//! Flow::Unsubscribe    ──► Registry::remove  (from the drain task itself)
//!
//! source ends ──► expired = true ──► terminate all drain tasks ──► registry cleared
//!             └─► subscribe / unsubscribe return BroadcastError::Expired from now on
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------|-------------------------------------------|
//! | **Broadcasting**  | Fan one event stream out to many subscribers.               | [`Broadcaster`]                           |
//! | **Ingestion**     | Producer handle and stream of events.                       | [`Bus`], [`Ingest`], [`Event`]            |
//! | **Subscribers**   | Per-consumer callbacks, self-unsubscribe via [`Flow`].      | [`Subscribe`], [`SubscribeFn`]            |
//! | **Queues**        | Unbounded by default, bounded with an overflow policy.      | [`Config`], [`OverflowPolicy`]            |
//! | **Errors**        | Typed errors returned synchronously.                        | [`BroadcastError`]                        |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that logs every event via `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanout::{Broadcaster, Config, Event, EventKind, Flow, SubscribeFn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (bus, broadcaster) = Broadcaster::channel(Config::default());
//!
//!     // One subscriber per websocket client; here it just prints.
//!     broadcaster.subscribe(SubscribeFn::arc("client-1", |ev: Arc<Event>| async move {
//!         println!("{} #{}", ev.kind, ev.seq);
//!         Flow::Continue
//!     }))?;
//!
//!     bus.publish(Event::new(EventKind::NamespaceCreated).with_payload("ci".to_string()))?;
//!     bus.publish(Event::log("step-build: ok"))?;
//!
//!     // Watchers gone: the broadcaster expires and terminates every subscriber.
//!     drop(bus);
//!     broadcaster.wait_expired().await;
//!     assert_eq!(broadcaster.pool_size(), 0);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Broadcaster, Config};
pub use error::BroadcastError;
pub use events::{Bus, Event, EventKind, Ingest, Payload};
pub use policies::OverflowPolicy;
pub use subscribers::{Flow, Subscribe, SubscribeFn, Subscriber, SubscriberId, SubscriberSpec};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
