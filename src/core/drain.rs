//! # Drain task: one per subscriber.
//!
//! Empties a subscriber's queue through its processing callback, then sleeps until the
//! fan-out loop wakes it again.
//!
//! ## States
//! ```text
//!            wake                       queue empty
//! Idle ─────────────► Draining ─────────────────────► Idle
//!   │                   │
//!   │ terminate         │ terminate / Flow::Unsubscribe / callback panic
//!   ▼                   ▼
//! Terminated ◄──────────┘
//! ```
//!
//! ## Architecture
//! ```text
//! loop {
//!   ├─► select(biased) { terminate → exit, wake → drain }
//!   └─► drain:
//!        loop {
//!          ├─► terminated?            → exit
//!          ├─► pop() → None           → back to Idle
//!          ├─► on_event(ev)
//!          │     ├─ Flow::Unsubscribe → registry.remove(id), exit
//!          │     └─ panic             → registry.remove(id), exit
//!          └─► more ? continue : back to Idle
//!        }
//! }
//! ```
//!
//! ## Rules
//! - The terminate signal is checked before **every** pop, so an unsubscribe that races
//!   an in-flight drain stops delivery after the current callback returns.
//! - Whatever is still queued when the task exits is discarded.
//! - A panicking callback is not recovered: the panic is caught only to remove the
//!   subscriber from the registry, and the drain task exits.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if the callback uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use crate::core::registry::Registry;
use crate::subscribers::{Flow, Shared, Subscribe};

/// Why a drain task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrainExit {
    /// Terminate signal observed (unsubscribe, overflow disconnect or expiry).
    Terminated,
    /// The callback returned [`Flow::Unsubscribe`].
    SelfUnsubscribed,
    /// The callback panicked.
    Panicked,
}

/// Runs the drain loop of one subscriber until it is terminated.
pub(crate) async fn drain(
    shared: Arc<Shared>,
    handler: Arc<dyn Subscribe>,
    registry: Arc<Registry>,
) -> DrainExit {
    let _guard = ExitGuard {
        shared: Arc::clone(&shared),
    };

    loop {
        tokio::select! {
            biased;
            _ = shared.terminate.cancelled() => return DrainExit::Terminated,
            _ = shared.queue.wait() => {}
        }

        loop {
            if shared.terminate.is_cancelled() {
                return DrainExit::Terminated;
            }
            let Some((ev, more)) = shared.queue.pop() else {
                break;
            };

            let fut = handler.on_event(ev);
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Unsubscribe) => {
                    detach(&registry, &shared, "self-unsubscribed");
                    return DrainExit::SelfUnsubscribed;
                }
                Err(panic_err) => {
                    error!(
                        subscriber = %shared.name,
                        id = %shared.id,
                        info = %panic_info(&*panic_err),
                        "processing callback panicked; removing subscriber"
                    );
                    detach(&registry, &shared, "removed after panic");
                    return DrainExit::Panicked;
                }
            }

            if !more {
                break;
            }
        }
    }
}

/// Removes the subscriber on its own behalf; losing a race with another removal is fine.
fn detach(registry: &Registry, shared: &Shared, what: &'static str) {
    match registry.remove(shared.id) {
        Ok(()) => debug!(subscriber = %shared.name, id = %shared.id, "{what}"),
        Err(err) => debug!(
            subscriber = %shared.name,
            id = %shared.id,
            reason = err.as_label(),
            "{what}; already removed"
        ),
    }
}

fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Discards whatever is still queued when the drain task ends.
struct ExitGuard {
    shared: Arc<Shared>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let discarded = self.shared.queue.clear();
        if discarded > 0 {
            debug!(
                subscriber = %self.shared.name,
                id = %self.shared.id,
                discarded,
                "discarded queued events"
            );
        }
    }
}
