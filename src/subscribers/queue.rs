//! # Per-subscriber event queue with idle wake-up.
//!
//! [`SubscriberQueue`] is an ordered FIFO of shared events plus the single-slot signal that
//! wakes the owning drain task.
//!
//! ## Protocol
//! ```text
//! fan-out loop                          drain task
//! ────────────                          ──────────
//! push(ev):                             wait()           (idle)
//!   lock                                  │
//!   was_idle = queue.is_empty()           │
//!   push_back(ev)                         │
//!   unlock                                │
//!   was_idle ? notify_one() ──────────────┘
//!                                       loop {
//!                                         pop() → (ev, more)
//!                                         callback(ev)
//!                                         more ? continue : break → wait()
//!                                       }
//! ```
//!
//! ## Rules
//! - Only the fan-out loop pushes; only the owning drain task pops.
//! - The wake is sent on the empty → non-empty transition only, so at most one
//!   notification is ever pending (a `Notify` permit).
//! - A wake that finds the queue empty is harmless: `pop` returns `None` and the
//!   drain task goes back to waiting.
//! - `push` is O(1) and never blocks on the consumer.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::events::Event;
use crate::policies::OverflowPolicy;

/// Outcome of a [`SubscriberQueue::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Push {
    /// Event appended.
    Queued,
    /// Queue full under `DropNewest`; the event was skipped.
    DroppedNewest,
    /// Queue full under `DropOldest`; the front event was evicted and this one appended.
    DroppedOldest,
    /// Queue full under `Disconnect`; the subscriber must be removed.
    Rejected,
}

/// Ordered buffer of pending events for one subscriber.
pub(crate) struct SubscriberQueue {
    items: Mutex<VecDeque<Arc<Event>>>,
    wake: Notify,
    limit: Option<NonZeroUsize>,
    overflow: OverflowPolicy,
}

impl SubscriberQueue {
    /// Creates an empty queue; `limit = None` means unbounded.
    pub(crate) fn new(limit: Option<NonZeroUsize>, overflow: OverflowPolicy) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            limit,
            overflow,
        }
    }

    /// Appends an event, waking the consumer if the queue was idle.
    pub(crate) fn push(&self, ev: Arc<Event>) -> Push {
        let mut items = self.items.lock();
        let was_idle = items.is_empty();

        let mut outcome = Push::Queued;
        if let Some(limit) = self.limit {
            if items.len() >= limit.get() {
                match self.overflow {
                    OverflowPolicy::DropNewest => return Push::DroppedNewest,
                    OverflowPolicy::Disconnect => return Push::Rejected,
                    OverflowPolicy::DropOldest => {
                        items.pop_front();
                        outcome = Push::DroppedOldest;
                    }
                }
            }
        }

        items.push_back(ev);
        drop(items);

        if was_idle {
            self.wake.notify_one();
        }
        outcome
    }

    /// Pops the front event.
    ///
    /// The flag is `true` when more events remain after this pop.
    pub(crate) fn pop(&self) -> Option<(Arc<Event>, bool)> {
        let mut items = self.items.lock();
        let ev = items.pop_front()?;
        Some((ev, !items.is_empty()))
    }

    /// Waits for the idle → non-idle wake.
    ///
    /// Returns immediately if a wake is already pending.
    pub(crate) async fn wait(&self) {
        self.wake.notified().await;
    }

    /// Discards every queued event, returning how many were dropped.
    pub(crate) fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let n = items.len();
        items.clear();
        n
    }

    /// Number of queued events (snapshot).
    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::events::EventKind;

    fn ev() -> Arc<Event> {
        Arc::new(Event::new(EventKind::Log))
    }

    fn unbounded() -> SubscriberQueue {
        SubscriberQueue::new(None, OverflowPolicy::default())
    }

    async fn woke(q: &SubscriberQueue) -> bool {
        tokio::time::timeout(Duration::from_millis(50), q.wait())
            .await
            .is_ok()
    }

    #[test]
    fn test_fifo_and_more_flag() {
        let q = unbounded();
        let (a, b) = (ev(), ev());
        let (sa, sb) = (a.seq, b.seq);
        q.push(a);
        q.push(b);

        let (first, more) = q.pop().unwrap();
        assert_eq!(first.seq, sa);
        assert!(more);

        let (second, more) = q.pop().unwrap();
        assert_eq!(second.seq, sb);
        assert!(!more);

        assert!(q.pop().is_none());
    }

    #[tokio::test]
    async fn test_wakes_only_on_idle_transition() {
        let q = unbounded();
        q.push(ev());
        q.push(ev());
        q.push(ev());

        // one permit for three pushes
        assert!(woke(&q).await);
        assert!(!woke(&q).await);

        while q.pop().is_some() {}
        q.push(ev());
        assert!(woke(&q).await);
    }

    #[tokio::test]
    async fn test_spurious_wake_is_harmless() {
        let q = unbounded();
        q.push(ev());
        q.pop();
        assert!(woke(&q).await);
        assert!(q.pop().is_none());
    }

    #[test]
    fn test_drop_newest_keeps_queue() {
        let q = SubscriberQueue::new(NonZeroUsize::new(2), OverflowPolicy::DropNewest);
        let (a, b) = (ev(), ev());
        let sa = a.seq;
        assert_eq!(q.push(a), Push::Queued);
        assert_eq!(q.push(b), Push::Queued);
        assert_eq!(q.push(ev()), Push::DroppedNewest);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().map(|(e, _)| e.seq), Some(sa));
    }

    #[test]
    fn test_drop_oldest_evicts_front() {
        let q = SubscriberQueue::new(NonZeroUsize::new(2), OverflowPolicy::DropOldest);
        q.push(ev());
        let b = ev();
        let c = ev();
        let (sb, sc) = (b.seq, c.seq);
        q.push(b);
        assert_eq!(q.push(c), Push::DroppedOldest);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().map(|(e, _)| e.seq), Some(sb));
        assert_eq!(q.pop().map(|(e, _)| e.seq), Some(sc));
    }

    #[test]
    fn test_disconnect_rejects() {
        let q = SubscriberQueue::new(NonZeroUsize::new(1), OverflowPolicy::Disconnect);
        assert_eq!(q.push(ev()), Push::Queued);
        assert_eq!(q.push(ev()), Push::Rejected);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_clear() {
        let q = unbounded();
        q.push(ev());
        q.push(ev());
        assert_eq!(q.clear(), 2);
        assert_eq!(q.len(), 0);
    }
}
