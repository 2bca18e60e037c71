//! Events: data model and ingestion channel.
//!
//! This module groups the event **data model** and the **bus** producers use to
//! feed the broadcaster.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and opaque payload
//! - [`Bus`], [`Ingest`] unbounded ingestion channel (producer handle / stream)
//!
//! ## Quick reference
//! - **Publishers**: external watchers, through [`Bus::publish`].
//! - **Consumer**: the broadcaster's fan-out loop, sole reader of the [`Ingest`] stream.

mod bus;
mod event;

pub use bus::{Bus, Ingest};
pub use event::{Event, EventKind, Payload};
