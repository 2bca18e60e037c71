//! # Overflow policy for bounded subscriber queues.
//!
//! [`OverflowPolicy`] decides what the fan-out loop does when a subscriber queue is bounded
//! and already holds `capacity` events.
//!
//! - [`OverflowPolicy::DropNewest`] the incoming event is skipped for that subscriber (default)
//! - [`OverflowPolicy::DropOldest`] the oldest queued event is evicted to make room
//! - [`OverflowPolicy::Disconnect`] the subscriber is removed and terminated
//!
//! Unbounded queues (the default, see [`Config`](crate::Config)) never consult this policy.
//!
//! ## Choosing the right policy
//! ```text
//! UI clients that re-fetch on reconnect   → Disconnect
//! Dashboards that only care about "now"   → DropOldest
//! Consumers that must not see reordering  → DropNewest
//! ```

/// Behavior of a bounded subscriber queue when it is full.
///
/// Every policy keeps the fan-out loop non-blocking; they differ only in which events the
/// slow subscriber loses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Skip the incoming event for this subscriber only.
    #[default]
    DropNewest,

    /// Evict the oldest queued event, then enqueue the incoming one.
    DropOldest,

    /// Remove the subscriber from the registry and send it the terminate signal.
    ///
    /// Queued events are discarded by the drain task as it exits.
    Disconnect,
}

impl OverflowPolicy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OverflowPolicy::DropNewest => "drop_newest",
            OverflowPolicy::DropOldest => "drop_oldest",
            OverflowPolicy::Disconnect => "disconnect",
        }
    }
}
