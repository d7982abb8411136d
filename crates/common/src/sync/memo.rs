//! Single-slot TTL memoizer
//!
//! [`TtlMemo`] caches the most recent outcome of one async operation. Calls
//! inside the TTL window get the stored (possibly still pending) result,
//! so overlapping callers share one execution. A failed result clears the
//! timestamp and the next call runs the operation again, however little
//! time has passed.
//!
//! The cache is not partitioned by argument: arguments only matter through
//! the optional force predicate.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use crate::time::{Clock, TokioClock};

/// Shared handle onto a memoized (possibly in-flight) result
pub type MemoFuture<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

type Operation<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type ForcePredicate<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

struct Slot<T, E> {
    value: Option<MemoFuture<T, E>>,
    timestamp: Option<Instant>,
    generation: u64,
}

/// TTL cache around a single async operation
pub struct TtlMemo<A, T, E> {
    label: Arc<str>,
    ttl: Duration,
    operation: Operation<A, T, E>,
    force: Option<ForcePredicate<A>>,
    clock: Arc<dyn Clock>,
    slot: Arc<Mutex<Slot<T, E>>>,
}

impl<A, T, E> TtlMemo<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Wrap `operation` with a cache window of `ttl`.
    ///
    /// `label` only appears in log events.
    pub fn new<F, Fut>(label: impl Into<Arc<str>>, ttl: Duration, operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            label: label.into(),
            ttl,
            operation: Arc::new(move |args| operation(args).boxed()),
            force: None,
            clock: Arc::new(TokioClock),
            slot: Arc::new(Mutex::new(Slot { value: None, timestamp: None, generation: 0 })),
        }
    }

    /// Bypass the cache whenever `predicate` holds for the call's arguments
    #[must_use]
    pub fn with_force<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.force = Some(Arc::new(predicate));
        self
    }

    /// Read time from `clock` instead of Tokio's clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the cached result or start a new execution.
    ///
    /// The timestamp is recorded before the operation runs, so calls that
    /// arrive while it is in flight share the pending result. The returned
    /// future is lazy: the operation makes progress once any holder polls
    /// it.
    ///
    /// `operation` is invoked while the slot is locked and must only build
    /// its future, never call back into this memo synchronously.
    pub fn call(&self, args: A) -> MemoFuture<T, E> {
        let forced = self.force.as_ref().is_some_and(|predicate| predicate(&args));
        let now = self.clock.now();
        let mut slot = self.slot.lock();

        if !forced && self.within_ttl(slot.timestamp, now) {
            if let Some(cached) = &slot.value {
                debug!(memo = %self.label, "cache hit");
                return cached.clone();
            }
        }

        slot.generation = slot.generation.wrapping_add(1);
        slot.timestamp = Some(now);
        debug!(memo = %self.label, forced, generation = slot.generation, "invoking operation");

        let pending = heal_on_failure(
            (self.operation)(args),
            Arc::downgrade(&self.slot),
            slot.generation,
            Arc::clone(&self.label),
        );
        slot.value = Some(pending.clone());
        pending
    }

    /// Drop the cached result; the next call runs the operation.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.timestamp = None;
        slot.value = None;
        debug!(memo = %self.label, "invalidated");
    }

    /// Whether a non-forced call right now would be a cache hit
    pub fn is_fresh(&self) -> bool {
        let slot = self.slot.lock();
        slot.value.is_some() && self.within_ttl(slot.timestamp, self.clock.now())
    }

    /// Configured cache window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn within_ttl(&self, timestamp: Option<Instant>, now: Instant) -> bool {
        timestamp.is_some_and(|at| now.saturating_duration_since(at) <= self.ttl)
    }
}

fn heal_on_failure<T, E>(
    operation: BoxFuture<'static, Result<T, E>>,
    slot: Weak<Mutex<Slot<T, E>>>,
    generation: u64,
    label: Arc<str>,
) -> MemoFuture<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    async move {
        let result = operation.await;
        if result.is_err() {
            if let Some(slot) = slot.upgrade() {
                let mut slot = slot.lock();
                // A newer call may already own the slot.
                if slot.generation == generation {
                    slot.timestamp = None;
                    debug!(memo = %label, "operation failed; cache cleared");
                }
            }
        }
        result
    }
    .boxed()
    .shared()
}

impl<A, T, E> Clone for TtlMemo<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            ttl: self.ttl,
            operation: Arc::clone(&self.operation),
            force: self.force.clone(),
            clock: Arc::clone(&self.clock),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<A, T, E> fmt::Debug for TtlMemo<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlMemo")
            .field("label", &self.label)
            .field("ttl", &self.ttl)
            .field("forcing", &self.force.is_some())
            .finish_non_exhaustive()
    }
}
