//! Synchronous publish/subscribe channel
//!
//! Listeners are invoked inline by [`EventChannel::emit`], in subscription
//! order, on the emitting task. A listener that unsubscribes itself (or
//! anyone else) during an emit does not affect the delivery already in
//! progress.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by [`EventChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Multi-subscriber event channel
///
/// Cloning the channel yields another handle onto the same subscriber list.
pub struct EventChannel<E> {
    listeners: Arc<Mutex<Vec<(SubscriptionId, Listener<E>)>>>,
    next_id: Arc<AtomicU64>,
}

impl<E> EventChannel<E> {
    /// Create a channel with no subscribers
    pub fn new() -> Self {
        Self { listeners: Arc::new(Mutex::new(Vec::new())), next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Register a listener; it receives every event emitted from now on
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` when the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Deliver `event` to every current listener, in subscription order
    ///
    /// The subscriber list is snapshotted before delivery so listeners may
    /// subscribe or unsubscribe without deadlocking.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> =
            self.listeners.lock().iter().map(|(_, listener)| Arc::clone(listener)).collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self { listeners: Arc::clone(&self.listeners), next_id: Arc::clone(&self.next_id) }
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel").field("subscribers", &self.subscriber_count()).finish()
    }
}
