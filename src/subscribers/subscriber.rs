//! # Subscriber handles and subscription specs.
//!
//! - [`SubscriberSpec`] describes a subscription before it exists: the processing callback,
//!   an optional display name and optional queue overrides.
//! - [`Subscriber`] is the handle [`Broadcaster::subscribe`](crate::Broadcaster::subscribe)
//!   returns; pass it back to [`Broadcaster::unsubscribe`](crate::Broadcaster::unsubscribe).
//! - [`SubscriberId`] is its identity: unique for the whole process and never reused.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanout::{Broadcaster, Bus, Event, Flow, OverflowPolicy, SubscribeFn, SubscriberSpec};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (_bus, ingest) = Bus::channel();
//! let broadcaster = Broadcaster::new(ingest);
//!
//! let spec = SubscriberSpec::new(SubscribeFn::arc("ws-client-7", |_ev: Arc<Event>| async { Flow::Continue }))
//!     .with_queue_capacity(256)
//!     .with_overflow(OverflowPolicy::Disconnect);
//!
//! let sub = broadcaster.subscribe_with(spec).unwrap();
//! assert_eq!(sub.name(), "ws-client-7");
//! assert_eq!(broadcaster.pool_size(), 1);
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::policies::OverflowPolicy;
use crate::subscribers::queue::SubscriberQueue;
use crate::subscribers::Subscribe;

/// Global counter for subscriber identities.
static SUBSCRIBER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique subscriber identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) fn next() -> Self {
        Self(SUBSCRIBER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Description of a subscription.
///
/// A spec without a handler ([`SubscriberSpec::default`]) is rejected by
/// [`Broadcaster::subscribe_with`](crate::Broadcaster::subscribe_with) with
/// [`BroadcastError::InvalidCallback`](crate::BroadcastError::InvalidCallback).
#[derive(Clone, Default)]
pub struct SubscriberSpec {
    handler: Option<Arc<dyn Subscribe>>,
    name: Option<Cow<'static, str>>,
    queue_capacity: Option<usize>,
    overflow: Option<OverflowPolicy>,
}

impl SubscriberSpec {
    /// Creates a spec for `handler` with the broadcaster's queue defaults.
    pub fn new(handler: Arc<dyn Subscribe>) -> Self {
        Self {
            handler: Some(handler),
            ..Self::default()
        }
    }

    /// Replaces the processing callback.
    pub fn with_handler(mut self, handler: Arc<dyn Subscribe>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Overrides the name used in logs (defaults to [`Subscribe::name`]).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the queue bound (`0` = unbounded).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Overrides the overflow policy of a bounded queue.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = Some(overflow);
        self
    }

    /// Returns `true` if a processing callback is set.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Splits the spec into its handler and a fresh subscriber, filling gaps from `cfg`.
    ///
    /// `None` when no handler is set.
    pub(crate) fn into_parts(self, cfg: &Config) -> Option<(Arc<dyn Subscribe>, Arc<Shared>)> {
        let handler = self.handler?;
        let name = self
            .name
            .unwrap_or_else(|| Cow::Owned(handler.name().to_string()));
        let limit = match self.queue_capacity {
            Some(cap) => NonZeroUsize::new(cap),
            None => cfg.queue_limit(),
        };
        let overflow = self.overflow.unwrap_or(cfg.overflow);

        let shared = Arc::new(Shared {
            id: SubscriberId::next(),
            name,
            queue: SubscriberQueue::new(limit, overflow),
            terminate: CancellationToken::new(),
        });
        Some((handler, shared))
    }
}

impl fmt::Debug for SubscriberSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberSpec")
            .field("handler", &self.handler.as_ref().map(|h| h.name().to_string()))
            .field("name", &self.name)
            .field("queue_capacity", &self.queue_capacity)
            .field("overflow", &self.overflow)
            .finish()
    }
}

impl From<Arc<dyn Subscribe>> for SubscriberSpec {
    fn from(handler: Arc<dyn Subscribe>) -> Self {
        Self::new(handler)
    }
}

/// State shared between the registry, the drain task and every [`Subscriber`] handle.
pub(crate) struct Shared {
    pub(crate) id: SubscriberId,
    pub(crate) name: Cow<'static, str>,
    pub(crate) queue: SubscriberQueue,
    /// Terminate signal; cancelled exactly when the subscriber leaves the registry.
    pub(crate) terminate: CancellationToken,
}

/// Handle to a registered subscriber.
///
/// Cheap to clone; every clone refers to the same subscription.
#[derive(Clone)]
pub struct Subscriber {
    pub(crate) shared: Arc<Shared>,
}

impl Subscriber {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Identity of this subscription.
    pub fn id(&self) -> SubscriberId {
        self.shared.id
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Number of events waiting for the callback (snapshot).
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Returns `true` once the subscriber has been removed for any reason.
    pub fn is_terminated(&self) -> bool {
        self.shared.terminate.is_cancelled()
    }

    /// Completes once the subscriber has been removed for any reason.
    pub async fn terminated(&self) {
        self.shared.terminate.cancelled().await;
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
