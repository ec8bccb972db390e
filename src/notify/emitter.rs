//! Publish/subscribe surface for signals.

use super::signal::Signal;
use crate::core::State;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked for each delivered signal.
pub type Listener<S> = Arc<dyn Fn(&Signal<S>) + Send + Sync>;

/// Handle returned by `subscribe`/`on`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription<S: State> {
    id: SubscriptionId,
    filter: Option<String>,
    listener: Listener<S>,
}

/// Delivers signals to subscribers.
///
/// Delivery is synchronous and fire-and-forget: the emitter does not report
/// listener outcomes, and a panicking listener is contained and logged
/// without affecting the others or the caller.
pub struct Emitter<S: State> {
    subscriptions: Mutex<Vec<Subscription<S>>>,
    next_id: AtomicU64,
}

impl<S: State> Default for Emitter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Emitter<S> {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn subscriptions(&self) -> MutexGuard<'_, Vec<Subscription<S>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, filter: Option<String>, listener: Listener<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions().push(Subscription {
            id,
            filter,
            listener,
        });
        id
    }

    /// Receive every signal.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Signal<S>) + Send + Sync + 'static,
    {
        self.add(None, Arc::new(listener))
    }

    /// Receive signals whose name equals `name`.
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&Signal<S>) + Send + Sync + 'static,
    {
        self.add(Some(name.into()), Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions().len()
    }

    /// Deliver `signal` to matching listeners in subscription order.
    ///
    /// Listeners run outside the subscription lock, so they may subscribe
    /// or unsubscribe themselves.
    pub fn emit(&self, signal: &Signal<S>) {
        let name = signal.name();
        let listeners: Vec<Listener<S>> = self
            .subscriptions()
            .iter()
            .filter(|s| s.filter.as_deref().is_none_or(|f| f == name))
            .map(|s| Arc::clone(&s.listener))
            .collect();

        tracing::trace!(signal = %name, listeners = listeners.len(), "Emitting signal");

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(signal))).is_err() {
                tracing::warn!(signal = %name, "Signal listener panicked; ignoring");
            }
        }
    }
}
