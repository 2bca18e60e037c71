//! # Subscribers: the consumer side of the broadcaster.
//!
//! This module provides the [`Subscribe`] trait, the handles and specs used to register
//! consumers, and the per-subscriber queue the fan-out loop writes into.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   fan-out loop ── push(Arc<Event>) ──► SubscriberQueue ──► drain task
//!                                                              │
//!                                                              ▼
//!                                                 Subscribe::on_event(Arc<Event>)
//!                                                              │
//!                                                    ┌─────────┴─────────┐
//!                                                    ▼                   ▼
//!                                              Flow::Continue    Flow::Unsubscribe
//! ```
//!
//! ## Contents
//! - [`Subscribe`], [`Flow`] processing callback and its verdict
//! - [`SubscribeFn`] closure adapter
//! - [`SubscriberSpec`] subscription description (handler, name, queue overrides)
//! - [`Subscriber`], [`SubscriberId`] handle and identity of a registered consumer
//! - `LogWriter` built-in logging subscriber (feature `logging`)

mod embedded;
mod queue;
mod subscribe;
mod subscribe_fn;
mod subscriber;

pub(crate) use queue::Push;
pub(crate) use subscriber::Shared;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::{Flow, Subscribe};
pub use subscribe_fn::SubscribeFn;
pub use subscriber::{Subscriber, SubscriberId, SubscriberSpec};
