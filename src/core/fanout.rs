//! # Fan-out loop: sole reader of the ingestion source.
//!
//! ```text
//! loop {
//!   ├─► source.next().await
//!   │     ├─ Some(ev) ─► registry.fan_out(ev)   (push into every subscriber queue)
//!   │     └─ None     ─► break
//! }
//! registry.expire()                              (terminate all, clear, flag expired)
//! ```
//!
//! ## Rules
//! - Exactly one fan-out loop per broadcaster; it never writes to the source.
//! - Pushes never block, so a stalled subscriber cannot stall ingestion.
//! - Events arriving while nobody is subscribed are dropped.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::trace;

use crate::core::registry::Registry;
use crate::events::Event;

/// Drives `source` to completion, then expires the registry.
pub(crate) async fn run(registry: Arc<Registry>, mut source: BoxStream<'static, Event>) {
    while let Some(ev) = source.next().await {
        trace!(seq = ev.seq, kind = %ev.kind, "fan-out");
        registry.fan_out(ev);
    }
    registry.expire();
}
