//! # Function-backed subscriber (`SubscribeFn`)
//!
//! [`SubscribeFn`] wraps a closure `F: Fn(Arc<Event>) -> Fut`, producing a fresh
//! future per event. Shared state goes into the closure explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use fanout::{Event, Flow, Subscribe, SubscribeFn};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = {
//!     let seen = Arc::clone(&seen);
//!     SubscribeFn::arc("counter", move |_ev: Arc<Event>| {
//!         let seen = Arc::clone(&seen);
//!         async move {
//!             seen.fetch_add(1, Ordering::Relaxed);
//!             Flow::Continue
//!         }
//!     })
//! };
//!
//! assert_eq!(counter.name(), "counter");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::{Flow, Subscribe};

/// Function-backed subscriber implementation.
pub struct SubscribeFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> SubscribeFn<F>
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscribeFn::arc`] when you immediately need an `Arc<dyn Subscribe>`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Debug for SubscribeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeFn").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> Subscribe for SubscribeFn<F>
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    async fn on_event(&self, event: Arc<Event>) -> Flow {
        (self.f)(event).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
