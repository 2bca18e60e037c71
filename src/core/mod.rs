//! Broadcaster core: registry, fan-out and drain tasks.
//!
//! The public API from this module is [`Broadcaster`] and its [`Config`].
//!
//! Internal modules:
//! - [`broadcaster`]: public handle; subscribe/unsubscribe/pool size/expiry;
//! - [`registry`]: subscriber map and expiry flag under one lock;
//! - [`fanout`]: the single ingestion reader pushing into subscriber queues;
//! - [`drain`]: one task per subscriber, emptying its queue through the callback;
//! - [`config`]: default queue bound and overflow policy.

mod broadcaster;
mod config;
mod drain;
mod fanout;
mod registry;

pub use broadcaster::Broadcaster;
pub use config::Config;
