//! Synchronous observer registries.
//!
//! A registry maps [`SubscriptionId`] to a callback. Ids are handed out from
//! a process-wide counter, so iterating the map in key order is iterating
//! in registration order, and an id from one registry can never collide
//! with an id from another.
//!
//! Callbacks are cloned out of the registry before they run, so a callback
//! may subscribe or unsubscribe without deadlocking. A panicking callback
//! is caught and logged; the remaining callbacks still run.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// Source of subscription ids, shared by every registry.
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// An ordered set of callbacks for one notification type.
pub struct ObserverRegistry<E> {
    callbacks: Mutex<BTreeMap<SubscriptionId, Callback<E>>>,
}

impl<E> ObserverRegistry<E> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            callbacks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register a callback. It will run after every callback registered
    /// before it.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        id
    }

    /// Remove a callback. Returns `true` if it was registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every callback in registration order.
    ///
    /// Returns the number of callbacks that completed without panicking.
    pub fn notify(&self, event: &E) -> usize {
        let callbacks: Vec<(SubscriptionId, Callback<E>)> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        let mut delivered: usize = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(_payload) => {
                    error!(subscription = %id, "Observer panicked, notification skipped for it");
                }
            }
        }
        delivered
    }
}

impl<E> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> core::fmt::Debug for ObserverRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}
