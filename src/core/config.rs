//! # Broadcaster configuration.
//!
//! Provides [`Config`] the default per-subscriber queue settings of a
//! [`Broadcaster`](crate::Broadcaster).
//!
//! Config is used in two ways:
//! 1. **Broadcaster creation**: `Broadcaster::with_config(config, source)`
//! 2. **Subscription defaults**: fields a [`SubscriberSpec`](crate::SubscriberSpec) leaves unset
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → unbounded queue (the overflow policy is never consulted)

use std::num::NonZeroUsize;

use crate::policies::OverflowPolicy;

/// Default queue policy applied to every new subscriber.
///
/// ## Field semantics
/// - `queue_capacity`: Max events buffered per subscriber (`0` = unbounded)
/// - `overflow`: What a full bounded queue does with the next event
///
/// ## Notes
/// All fields are public for flexibility. Prefer [`Config::queue_limit`] over checking
/// the `0` sentinel directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Per-subscriber queue bound.
    ///
    /// - `0` = unbounded; a stalled consumer grows only its own queue
    /// - `n > 0` = at most `n` pending events, then `overflow` applies
    pub queue_capacity: usize,

    /// Overflow policy for bounded queues.
    pub overflow: OverflowPolicy,
}

impl Config {
    /// Returns the queue bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` queued events per subscriber
    #[inline]
    pub fn queue_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.queue_capacity)
    }

    /// Returns a config with bounded queues of `capacity` events.
    pub fn bounded(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            queue_capacity: capacity,
            overflow,
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 0` (unbounded)
    /// - `overflow = OverflowPolicy::DropNewest` (only used when bounded)
    fn default() -> Self {
        Self {
            queue_capacity: 0,
            overflow: OverflowPolicy::default(),
        }
    }
}
