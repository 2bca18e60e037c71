//! # LogWriter: simple event logger
//!
//! A minimal subscriber that logs incoming [`Event`]s through `tracing`.
//! Use it for tests, demos, or to watch a live ingestion stream.
//!
//! ## Example output (with a `fmt` subscriber installed)
//! ```text
//! INFO fanout::subscribers::embedded::log: event kind=PipelineRunCreated seq=12 payload=true
//! INFO fanout::subscribers::embedded::log: event kind=Log seq=13 payload=true line="step-build: ok"
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::events::{Event, EventKind};
use crate::subscribers::{Flow, Subscribe};

/// Event logging subscriber. Never unsubscribes on its own.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: Arc<Event>) -> Flow {
        match e.kind {
            EventKind::Log => {
                let line = e.payload_as::<String>().map(String::as_str).unwrap_or("");
                info!(kind = %e.kind, seq = e.seq, payload = e.payload.is_some(), line, "event");
            }
            _ => {
                info!(kind = %e.kind, seq = e.seq, payload = e.payload.is_some(), "event");
            }
        }
        Flow::Continue
    }

    fn name(&self) -> &str {
        "LogWriter"
    }
}
