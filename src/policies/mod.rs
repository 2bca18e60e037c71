//! Queue policies.
//!
//! This module groups the knobs that control what happens to a subscriber whose
//! bounded queue fills up.
//!
//! ## Contents
//! - [`OverflowPolicy`] drop newest / drop oldest / disconnect
//!
//! ## Quick wiring
//! ```text
//! Config { queue_capacity, overflow }   SubscriberSpec::with_overflow(..)
//!      └────────────┬───────────────────────────┘
//!                   ▼
//!        SubscriberQueue::push() consults the policy when full
//! ```
//!
//! ## Defaults
//! - Queues are unbounded, so no policy applies.
//! - `OverflowPolicy::DropNewest` once a capacity is set.

mod overflow;

pub use overflow::OverflowPolicy;
