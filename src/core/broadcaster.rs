//! # Broadcaster: fans one ingestion stream out to many subscribers.
//!
//! The [`Broadcaster`] owns the subscriber registry and the single reader of the ingestion
//! source. Each subscriber gets its own queue and drain task, so consumers proceed at their
//! own pace and a stalled one only grows its own queue.
//!
//! ## Key responsibilities
//! - read the ingestion source (sole reader) and **fan-out** every event to every subscriber
//! - register/remove subscribers concurrently with an active fan-out
//! - expire permanently when the source ends: terminate every subscriber, refuse new ones
//!
//! ## High-level architecture
//! ```text
//! Producers ──► Bus ──► Ingest ──► fan-out loop ──► Registry::fan_out(ev)
//!                                                     ┌─────────┬─────────┐
//!                                                     ▼         ▼         ▼
//!                                              [queue S1] [queue S2] ... [queue SN]
//!                                                     │         │         │
//!                                              drain S1  drain S2  ...  drain SN
//!                                                     │         │         │
//!                                          sub.on_event(Arc<Event>) → Flow
//!
//! End of stream:
//!   fan-out loop ──► Registry::expire()
//!                      ├─► expired = true
//!                      ├─► terminate every drain task
//!                      └─► clear registry
//! ```
//!
//! ## Guarantees
//! - Per-subscriber delivery order equals ingestion order.
//! - No ordering across subscribers.
//! - A subscriber registered concurrently with a fan-out scan either gets the event or not;
//!   never twice, never partially.
//! - At-most-once delivery; nothing is persisted or replayed.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use fanout::{Broadcaster, Bus, Event, EventKind, Flow, SubscribeFn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), fanout::BroadcastError> {
//! let (bus, ingest) = Bus::channel();
//! let broadcaster = Broadcaster::new(ingest);
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! let sub = broadcaster.subscribe(SubscribeFn::arc("client", move |_ev: Arc<Event>| {
//!     let counter = Arc::clone(&counter);
//!     async move {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Flow::Continue
//!     }
//! }))?;
//! assert_eq!(broadcaster.pool_size(), 1);
//!
//! bus.publish(Event::new(EventKind::PipelineRunCreated))?;
//! while seen.load(Ordering::SeqCst) < 1 {
//!     tokio::task::yield_now().await;
//! }
//!
//! broadcaster.unsubscribe(&sub)?;
//! assert_eq!(broadcaster.pool_size(), 0);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};

use crate::core::{Config, fanout, registry::Registry};
use crate::error::BroadcastError;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, Subscriber, SubscriberSpec};

/// Fans a single event stream out to independently paced subscribers.
///
/// Cheap to clone; every clone addresses the same registry and fan-out loop.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    /// Takes ownership of `source` and starts broadcasting immediately.
    ///
    /// Events arriving while nobody is subscribed are discarded. When `source` ends the
    /// broadcaster expires.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime: the fan-out loop is spawned right away.
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = Event> + Send + 'static,
    {
        Self::with_config(Config::default(), source)
    }

    /// Same as [`Broadcaster::new`], with explicit queue defaults.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn with_config<S>(cfg: Config, source: S) -> Self
    where
        S: Stream<Item = Event> + Send + 'static,
    {
        let registry = Registry::new(cfg);
        registry.spawn(fanout::run(Arc::clone(&registry), source.boxed()));
        Self { registry }
    }

    /// Creates an ingestion channel and a broadcaster reading it.
    ///
    /// Dropping every clone of the returned [`Bus`] expires the broadcaster.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn channel(cfg: Config) -> (Bus, Self) {
        let (bus, ingest) = Bus::channel();
        (bus, Self::with_config(cfg, ingest))
    }

    /// Registers `handler` with the broadcaster's queue defaults.
    ///
    /// Spawns one drain task that lives until the subscriber is removed. The task runs on the
    /// runtime the broadcaster was created in, so this may be called from any thread,
    /// including ones without a Tokio context.
    ///
    /// Returns [`BroadcastError::Expired`] once the source has ended.
    pub fn subscribe(&self, handler: Arc<dyn Subscribe>) -> Result<Subscriber, BroadcastError> {
        self.subscribe_with(SubscriberSpec::new(handler))
    }

    /// Registers a subscriber described by `spec`.
    ///
    /// Returns [`BroadcastError::Expired`] once the source has ended, otherwise
    /// [`BroadcastError::InvalidCallback`] if `spec` has no handler.
    pub fn subscribe_with(&self, spec: SubscriberSpec) -> Result<Subscriber, BroadcastError> {
        self.registry.insert(spec)
    }

    /// Removes `subscriber` and stops its drain task.
    ///
    /// A callback already running finishes; nothing further is delivered and queued events
    /// are discarded.
    ///
    /// Returns [`BroadcastError::Expired`] once the source has ended, or
    /// [`BroadcastError::NotFound`] if the subscriber is not registered here (including a
    /// second call for the same subscriber).
    pub fn unsubscribe(&self, subscriber: &Subscriber) -> Result<(), BroadcastError> {
        self.registry.remove(subscriber.id())
    }

    /// Number of registered subscribers.
    ///
    /// Best-effort: a counted subscriber may be gone right after the count is taken.
    /// Always `0` once expired.
    pub fn pool_size(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` once the ingestion source has ended.
    pub fn expired(&self) -> bool {
        self.registry.is_expired()
    }

    /// Completes once the broadcaster has expired.
    pub async fn wait_expired(&self) {
        self.registry.expired().await;
    }

    /// Returns `true` if `subscriber` is currently registered with this broadcaster.
    pub fn is_subscribed(&self, subscriber: &Subscriber) -> bool {
        self.registry.contains(subscriber.id())
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("pool_size", &self.pool_size())
            .field("expired", &self.expired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::Semaphore;
    use tokio::time::{Instant, sleep, timeout};

    use crate::events::EventKind;
    use crate::policies::OverflowPolicy;
    use crate::subscribers::{Flow, SubscribeFn};

    const WAIT: Duration = Duration::from_secs(2);

    /// Records the sequence numbers it receives.
    #[derive(Default)]
    struct Recorder {
        seqs: Mutex<Vec<u64>>,
        entered: AtomicUsize,
        stop_after: Option<usize>,
        gate: Option<Arc<Semaphore>>,
        delay: Option<Duration>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn stopping_after(n: usize) -> Arc<Self> {
            Arc::new(Self {
                stop_after: Some(n),
                ..Self::default()
            })
        }

        fn gated(gate: &Arc<Semaphore>) -> Arc<Self> {
            Arc::new(Self {
                gate: Some(Arc::clone(gate)),
                ..Self::default()
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay: Some(delay),
                ..Self::default()
            })
        }

        fn count(&self) -> usize {
            self.seqs.lock().len()
        }

        fn seqs(&self) -> Vec<u64> {
            self.seqs.lock().clone()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: Arc<Event>) -> Flow {
            self.entered.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await;
            }
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let n = {
                let mut seqs = self.seqs.lock();
                seqs.push(ev.seq);
                seqs.len()
            };
            match self.stop_after {
                Some(limit) if n >= limit => Flow::Unsubscribe,
                _ => Flow::Continue,
            }
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    struct Panicking;

    #[async_trait]
    impl Subscribe for Panicking {
        async fn on_event(&self, _ev: Arc<Event>) -> Flow {
            panic!("callback exploded");
        }
    }

    async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        loop {
            if cond() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(5)).await;
        }
    }

    fn send(bus: &Bus, n: usize) -> Vec<u64> {
        (0..n)
            .map(|_| {
                let ev = Event::new(EventKind::TaskRunUpdated);
                let seq = ev.seq;
                bus.publish(ev).unwrap();
                seq
            })
            .collect()
    }

    async fn close_and_await_expired(bus: Bus, b: &Broadcaster) {
        drop(bus);
        timeout(WAIT, b.wait_expired())
            .await
            .expect("broadcaster did not expire");
    }

    #[tokio::test]
    async fn test_normal_subscribe_unsubscribe() {
        let (_bus, b) = Broadcaster::channel(Config::default());
        let sub = b.subscribe(Recorder::new()).unwrap();
        assert_eq!(b.pool_size(), 1);
        assert!(b.is_subscribed(&sub));

        assert_eq!(b.unsubscribe(&sub), Ok(()));
        assert_eq!(b.pool_size(), 0);
        assert_eq!(
            b.unsubscribe(&sub),
            Err(BroadcastError::NotFound { id: sub.id() })
        );
        assert!(eventually(|| sub.is_terminated()).await);
    }

    #[tokio::test]
    async fn test_expired_rejects_subscribe_and_unsubscribe() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let sub = b.subscribe(Recorder::new()).unwrap();
        close_and_await_expired(bus, &b).await;

        assert!(b.expired());
        assert_eq!(
            b.subscribe(Recorder::new()).unwrap_err(),
            BroadcastError::Expired
        );
        assert_eq!(b.unsubscribe(&sub), Err(BroadcastError::Expired));
    }

    #[tokio::test]
    async fn test_close_immediately_expires() {
        let (bus, b) = Broadcaster::channel(Config::default());
        close_and_await_expired(bus, &b).await;
        assert!(b.expired());
        assert_eq!(b.pool_size(), 0);
        assert_eq!(
            b.subscribe(Recorder::new()).unwrap_err(),
            BroadcastError::Expired
        );
    }

    #[tokio::test]
    async fn test_close_clears_pool_and_terminates() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let subs: Vec<_> = (0..3).map(|_| b.subscribe(Recorder::new()).unwrap()).collect();
        assert_eq!(b.pool_size(), 3);

        close_and_await_expired(bus, &b).await;
        assert_eq!(b.pool_size(), 0);
        for sub in &subs {
            assert!(sub.is_terminated());
            assert!(!b.is_subscribed(sub));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_subscriber_gets_every_event() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let recorders: Vec<_> = (0..100).map(|_| Recorder::new()).collect();
        for r in &recorders {
            b.subscribe(r.clone()).unwrap();
        }

        let sent = send(&bus, 10);
        assert!(eventually(|| recorders.iter().all(|r| r.count() == 10)).await);
        for r in &recorders {
            assert_eq!(r.seqs(), sent);
        }
        assert_eq!(b.pool_size(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_preserved_for_slow_subscriber() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let slow = Recorder::slow(Duration::from_millis(2));
        let fast = Recorder::new();
        b.subscribe(slow.clone()).unwrap();
        b.subscribe(fast.clone()).unwrap();

        let sent = send(&bus, 50);
        assert!(eventually(|| slow.count() == 50 && fast.count() == 50).await);
        assert_eq!(slow.seqs(), sent);
        assert_eq!(fast.seqs(), sent);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_callback_stop_unsubscribes() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let quitter = Recorder::stopping_after(3);
        let stayer = Recorder::new();
        let quitter_sub = b.subscribe(quitter.clone()).unwrap();
        b.subscribe(stayer.clone()).unwrap();

        send(&bus, 5);
        assert!(eventually(|| stayer.count() == 5).await);
        assert!(eventually(|| quitter_sub.is_terminated()).await);

        sleep(Duration::from_millis(50)).await;
        assert_eq!(quitter.count(), 3);
        assert_eq!(b.pool_size(), 1);
        assert_eq!(
            b.unsubscribe(&quitter_sub),
            Err(BroadcastError::NotFound { id: quitter_sub.id() })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_blocked_subscriber_does_not_stall_others() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let stuck = b
            .subscribe(SubscribeFn::arc("stuck", |_ev: Arc<Event>| async {
                std::future::pending::<()>().await;
                Flow::Continue
            }))
            .unwrap();
        let healthy = Recorder::new();
        b.subscribe(healthy.clone()).unwrap();

        let sent = send(&bus, 20);
        assert!(eventually(|| healthy.count() == 20).await);
        assert_eq!(healthy.seqs(), sent);
        assert!(eventually(|| stuck.pending() == 19).await);

        let late = Recorder::new();
        let late_sub = b.subscribe(late.clone()).unwrap();
        assert_eq!(b.pool_size(), 3);
        assert_eq!(b.unsubscribe(&stuck), Ok(()));
        assert_eq!(b.unsubscribe(&late_sub), Ok(()));
        assert_eq!(b.pool_size(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unsubscribe_during_drain() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let gate = Arc::new(Semaphore::new(0));
        let listener = Recorder::new();
        let leaver = Recorder::gated(&gate);
        b.subscribe(listener.clone()).unwrap();
        let leaver_sub = b.subscribe(leaver.clone()).unwrap();

        send(&bus, 1);
        assert!(eventually(|| leaver.entered.load(Ordering::SeqCst) == 1).await);
        send(&bus, 3);
        assert!(eventually(|| listener.count() == 4).await);

        // the leaver is mid-callback with three events queued behind it
        assert_eq!(b.unsubscribe(&leaver_sub), Ok(()));
        gate.add_permits(16);
        send(&bus, 1);

        assert!(eventually(|| listener.count() == 5).await);
        assert!(eventually(|| leaver_sub.pending() == 0).await);
        assert_eq!(leaver.count(), 1);
        assert_eq!(b.pool_size(), 1);
    }

    #[tokio::test]
    async fn test_missing_callback_is_rejected() {
        let (bus, b) = Broadcaster::channel(Config::default());
        assert_eq!(
            b.subscribe_with(SubscriberSpec::default()).unwrap_err(),
            BroadcastError::InvalidCallback
        );
        assert_eq!(b.pool_size(), 0);

        close_and_await_expired(bus, &b).await;
        assert_eq!(
            b.subscribe_with(SubscriberSpec::default()).unwrap_err(),
            BroadcastError::Expired
        );
    }

    #[tokio::test]
    async fn test_foreign_subscriber_not_found() {
        let (_bus_a, a) = Broadcaster::channel(Config::default());
        let (_bus_b, b) = Broadcaster::channel(Config::default());
        let sub = a.subscribe(Recorder::new()).unwrap();
        assert_eq!(
            b.unsubscribe(&sub),
            Err(BroadcastError::NotFound { id: sub.id() })
        );
        assert!(a.is_subscribed(&sub));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overflow_disconnect() {
        let (bus, b) = Broadcaster::channel(Config::bounded(1, OverflowPolicy::Disconnect));
        let gate = Arc::new(Semaphore::new(0));
        let slow = Recorder::gated(&gate);
        let witness = Recorder::new();
        let slow_sub = b.subscribe(slow.clone()).unwrap();
        b.subscribe_with(SubscriberSpec::new(witness.clone()).with_queue_capacity(0))
            .unwrap();

        send(&bus, 1);
        assert!(eventually(|| slow.entered.load(Ordering::SeqCst) == 1).await);
        send(&bus, 2);

        assert!(eventually(|| slow_sub.is_terminated()).await);
        assert!(eventually(|| witness.count() == 3).await);
        assert_eq!(b.pool_size(), 1);
        gate.add_permits(16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overflow_drop_newest() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let gate = Arc::new(Semaphore::new(0));
        let slow = Recorder::gated(&gate);
        let witness = Recorder::new();
        b.subscribe_with(
            SubscriberSpec::new(slow.clone())
                .with_queue_capacity(2)
                .with_overflow(OverflowPolicy::DropNewest),
        )
        .unwrap();
        b.subscribe(witness.clone()).unwrap();

        let first = send(&bus, 1);
        assert!(eventually(|| slow.entered.load(Ordering::SeqCst) == 1).await);
        let rest = send(&bus, 3);
        assert!(eventually(|| witness.count() == 4).await);

        gate.add_permits(16);
        assert!(eventually(|| slow.count() == 3).await);
        sleep(Duration::from_millis(20)).await;
        assert_eq!(slow.seqs(), vec![first[0], rest[0], rest[1]]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overflow_drop_oldest() {
        let (bus, b) = Broadcaster::channel(Config::bounded(2, OverflowPolicy::DropOldest));
        let gate = Arc::new(Semaphore::new(0));
        let slow = Recorder::gated(&gate);
        let witness = Recorder::new();
        b.subscribe(slow.clone()).unwrap();
        b.subscribe_with(SubscriberSpec::new(witness.clone()).with_queue_capacity(0))
            .unwrap();

        let first = send(&bus, 1);
        assert!(eventually(|| slow.entered.load(Ordering::SeqCst) == 1).await);
        let rest = send(&bus, 3);
        assert!(eventually(|| witness.count() == 4).await);

        gate.add_permits(16);
        assert!(eventually(|| slow.count() == 3).await);
        sleep(Duration::from_millis(20)).await;
        assert_eq!(slow.seqs(), vec![first[0], rest[1], rest[2]]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_callback_is_removed() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let bad = b.subscribe(Arc::new(Panicking)).unwrap();
        let good = Recorder::new();
        b.subscribe(good.clone()).unwrap();

        send(&bus, 3);
        assert!(eventually(|| good.count() == 3).await);
        assert!(eventually(|| bad.is_terminated()).await);
        assert_eq!(b.pool_size(), 1);
        assert!(eventually(|| bad.pending() == 0).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_event_is_shared_not_copied() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let ptrs = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let ptrs = Arc::clone(&ptrs);
            b.subscribe(SubscribeFn::arc(format!("ptr-{i}"), move |ev: Arc<Event>| {
                let ptrs = Arc::clone(&ptrs);
                async move {
                    ptrs.lock().push(Arc::as_ptr(&ev) as usize);
                    Flow::Continue
                }
            }))
            .unwrap();
        }

        send(&bus, 1);
        assert!(eventually(|| ptrs.lock().len() == 3).await);
        let ptrs = ptrs.lock();
        assert!(ptrs.iter().all(|p| *p == ptrs[0]));
    }

    #[tokio::test]
    async fn test_custom_source_stream() {
        let events: Vec<Event> = (0..4).map(|_| Event::new(EventKind::NamespaceCreated)).collect();
        let b = Broadcaster::new(futures::stream::iter(events));
        timeout(WAIT, b.wait_expired()).await.unwrap();
        assert!(b.expired());
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let (_bus, b) = Broadcaster::channel(Config::default());
        let other = b.clone();
        let sub = other.subscribe(Recorder::new()).unwrap();
        assert_eq!(b.pool_size(), 1);
        assert_eq!(b.unsubscribe(&sub), Ok(()));
        assert_eq!(other.pool_size(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscribe_from_thread_without_runtime() {
        let (bus, b) = Broadcaster::channel(Config::default());
        let recorder = Recorder::new();

        let acceptor = {
            let b = b.clone();
            let recorder = Arc::clone(&recorder);
            std::thread::spawn(move || b.subscribe(recorder))
        };
        let sub = tokio::task::spawn_blocking(move || acceptor.join())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(b.is_subscribed(&sub));

        let sent = send(&bus, 5);
        assert!(eventually(|| recorder.count() == 5).await);
        assert_eq!(recorder.seqs(), sent);

        let unsub = {
            let b = b.clone();
            std::thread::spawn(move || b.unsubscribe(&sub))
        };
        let res = tokio::task::spawn_blocking(move || unsub.join())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res, Ok(()));
        assert_eq!(b.pool_size(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_churn_during_fan_out_delivers_contiguous_slices() {
        const EVENTS: usize = 2000;
        const JOINERS: usize = 120;

        let (bus, b) = Broadcaster::channel(Config::default());
        let producer = tokio::spawn(async move {
            let mut sent = Vec::with_capacity(EVENTS + 1);
            for i in 0..EVENTS {
                let ev = Event::new(EventKind::PipelineRunUpdated);
                sent.push(ev.seq);
                bus.publish(ev).unwrap();
                if i % 16 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            (sent, bus)
        });

        let mut stayers = Vec::new();
        let mut leavers = Vec::new();
        for i in 0..JOINERS {
            let r = Recorder::new();
            let sub = b.subscribe(r.clone()).unwrap();
            tokio::task::yield_now().await;
            if i % 2 == 0 {
                assert_eq!(b.unsubscribe(&sub), Ok(()));
                leavers.push(r);
            } else {
                stayers.push(r);
            }
        }

        let (mut sent, bus) = producer.await.unwrap();
        // Trailing marker: every subscriber still registered must end on it.
        sent.extend(send(&bus, 1));
        let last = *sent.last().unwrap();
        assert_eq!(b.pool_size(), stayers.len());
        assert!(eventually(|| stayers.iter().all(|r| r.seqs().last() == Some(&last))).await);

        for r in stayers.iter().chain(leavers.iter()) {
            let got = r.seqs();
            let Some(first) = got.first() else { continue };
            let start = sent.iter().position(|s| s == first).unwrap();
            assert!(start + got.len() <= sent.len());
            assert_eq!(&sent[start..start + got.len()], &got[..]);
        }

        close_and_await_expired(bus, &b).await;
        assert_eq!(b.pool_size(), 0);
    }
}
