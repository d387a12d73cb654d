//! Domain events and cancellable subscriptions.
//!
//! An [`EventSource`] may be raised from any thread. Handlers therefore have
//! to be `Send + Sync`, which keeps presentation handles (the `Rc`-based
//! workspace and messenger) out of them: a handler that wants to touch
//! presentation state must go through a
//! [`Dispatcher`](crate::dispatcher::Dispatcher).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Handlers<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Handler<E>)>>,
}

impl<E> Handlers<E> {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Handler<E>)>> {
        // Handlers run outside the lock, so a poisoned list is still
        // consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Multicast domain event that plugins subscribe to.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use orimath_plugins::event::EventSource;
///
/// let source = EventSource::<u32>::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
/// let subscription = source.subscribe(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// source.emit(&7);
/// subscription.cancel();
/// source.emit(&8);
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct EventSource<E> {
    handlers: Arc<Handlers<E>>,
}

impl<E: 'static> EventSource<E> {
    /// Creates an event with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Handlers {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers `handler`, returning the handle that keeps it registered.
    ///
    /// Dropping the [`Subscription`] unsubscribes the handler.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.handlers.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().push((id, Arc::new(handler)));

        let weak: Weak<Handlers<E>> = Arc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = weak.upgrade() {
                handlers.remove(id);
            }
        })
    }

    /// Invokes every live handler with `event`, returning how many ran.
    ///
    /// Handlers are snapshotted before invocation, so a handler may
    /// subscribe or cancel without deadlocking.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Handler<E>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl<E: 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .handlers
            .entries
            .lock()
            .map_or(0, |entries| entries.len());
        f.debug_struct("EventSource")
            .field("subscribers", &count)
            .finish()
    }
}

/// Handle keeping one event handler registered.
///
/// Dropping the handle (or calling [`Subscription::cancel`]) unsubscribes.
/// Plugins that want a handler to outlive their entry point pass the handle
/// to [`PluginContext::hold`](crate::context::PluginContext::hold).
#[must_use = "dropping a subscription unsubscribes its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribes the handler now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests;
