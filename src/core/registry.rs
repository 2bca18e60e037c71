//! # Subscriber registry with expiry.
//!
//! Owns the set of active subscribers and the `expired` flag under **one** lock, so
//! "check expired" and "mutate registry" are always atomic together.
//!
//! ## Architecture
//! ```text
//! Broadcaster::subscribe_with   ─► Registry::insert      (spawns drain task)
//! Broadcaster::unsubscribe      ─► Registry::remove      (terminate signal)
//! drain task (Flow::Unsubscribe)─► Registry::remove
//! fan-out loop, per event       ─► Registry::fan_out     (push into every queue)
//! fan-out loop, end of stream   ─► Registry::expire      (terminate all, clear)
//! ```
//!
//! ## Rules
//! - Registry owns the subscriber shared state; drain tasks own the handlers.
//! - A subscriber is either fully registered before a fan-out scan or fully absent.
//! - Once expired, the map is empty forever and every mutation returns `Expired`.
//! - The lock is never held across an `.await`; queue locks nest inside it, one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::{Config, drain};
use crate::error::BroadcastError;
use crate::events::Event;
use crate::subscribers::{Push, Shared, Subscriber, SubscriberId, SubscriberSpec};

/// Lock-protected registry state.
struct State {
    expired: bool,
    subscribers: HashMap<SubscriberId, Arc<Shared>>,
}

/// Registry of active subscribers.
pub(crate) struct Registry {
    state: Mutex<State>,
    cfg: Config,
    /// Runtime the drain tasks are spawned on, captured at construction.
    runtime: Handle,
    /// Cancelled once, right after expiry.
    expiry: CancellationToken,
}

impl Registry {
    /// Creates an empty, live registry bound to the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn new(cfg: Config) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                expired: false,
                subscribers: HashMap::new(),
            }),
            cfg,
            runtime: Handle::current(),
            expiry: CancellationToken::new(),
        })
    }

    /// Spawns `fut` on the registry's runtime.
    pub(crate) fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(fut);
    }

    /// Registers a new subscriber and spawns its drain task.
    ///
    /// Expiry is checked before the handler, so an expired broadcaster always
    /// reports `Expired`. Callable from any thread; the drain task runs on the runtime
    /// captured in [`Registry::new`].
    pub(crate) fn insert(self: &Arc<Self>, spec: SubscriberSpec) -> Result<Subscriber, BroadcastError> {
        let mut state = self.state.lock();
        if state.expired {
            return Err(BroadcastError::Expired);
        }
        let (handler, shared) = spec
            .into_parts(&self.cfg)
            .ok_or(BroadcastError::InvalidCallback)?;

        let registry = Arc::clone(self);
        let worker = Arc::clone(&shared);
        self.runtime.spawn(async move {
            let id = worker.id;
            let exit = drain::drain(worker, handler, registry).await;
            debug!(id = %id, ?exit, "drain task exited");
        });

        debug!(subscriber = %shared.name, id = %shared.id, "subscribed");
        state.subscribers.insert(shared.id, Arc::clone(&shared));
        Ok(Subscriber::new(shared))
    }

    /// Removes a subscriber and sends it the terminate signal.
    pub(crate) fn remove(&self, id: SubscriberId) -> Result<(), BroadcastError> {
        let mut state = self.state.lock();
        if state.expired {
            return Err(BroadcastError::Expired);
        }
        let shared = state
            .subscribers
            .remove(&id)
            .ok_or(BroadcastError::NotFound { id })?;
        drop(state);

        shared.terminate.cancel();
        debug!(subscriber = %shared.name, id = %id, "unsubscribed");
        Ok(())
    }

    /// Appends `ev` to every registered subscriber's queue.
    ///
    /// Subscribers whose bounded queue rejects the event under
    /// [`OverflowPolicy::Disconnect`](crate::OverflowPolicy::Disconnect) are removed in
    /// the same critical section.
    pub(crate) fn fan_out(&self, ev: Event) {
        let ev = Arc::new(ev);
        let mut state = self.state.lock();
        if state.expired {
            return;
        }

        let mut rejected = Vec::new();
        for (id, shared) in &state.subscribers {
            match shared.queue.push(Arc::clone(&ev)) {
                Push::Queued => {}
                Push::DroppedNewest => {
                    warn!(
                        subscriber = %shared.name,
                        id = %id,
                        seq = ev.seq,
                        "subscriber queue full; incoming event dropped"
                    );
                }
                Push::DroppedOldest => {
                    warn!(
                        subscriber = %shared.name,
                        id = %id,
                        seq = ev.seq,
                        "subscriber queue full; oldest event evicted"
                    );
                }
                Push::Rejected => rejected.push(*id),
            }
        }

        for id in rejected {
            if let Some(shared) = state.subscribers.remove(&id) {
                shared.terminate.cancel();
                warn!(
                    subscriber = %shared.name,
                    id = %id,
                    seq = ev.seq,
                    "subscriber queue full; disconnected"
                );
            }
        }
    }

    /// Marks the registry expired, terminates every subscriber and clears the map.
    ///
    /// Idempotent.
    pub(crate) fn expire(&self) {
        let mut state = self.state.lock();
        if state.expired {
            return;
        }
        state.expired = true;

        let terminated = state.subscribers.len();
        for (_, shared) in state.subscribers.drain() {
            shared.terminate.cancel();
        }
        drop(state);

        self.expiry.cancel();
        info!(terminated, "ingestion ended; broadcaster expired");
    }

    /// Snapshot count of registered subscribers (0 once expired).
    pub(crate) fn len(&self) -> usize {
        let state = self.state.lock();
        if state.expired {
            0
        } else {
            state.subscribers.len()
        }
    }

    /// Lock-protected read of the expiry flag.
    pub(crate) fn is_expired(&self) -> bool {
        self.state.lock().expired
    }

    /// Returns `true` if `id` is currently registered.
    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.state.lock().subscribers.contains_key(&id)
    }

    /// Completes once [`Registry::expire`] has run.
    pub(crate) async fn expired(&self) {
        self.expiry.cancelled().await;
    }
}
