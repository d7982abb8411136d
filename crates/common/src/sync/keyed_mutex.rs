//! Keyed mutual exclusion with bounded waits
//!
//! Each key has at most one registered slot, the release signal of the most
//! recent acquirer. A new acquisition overwrites the slot and waits only on
//! the slot it replaced, so waiters form an implicit chain rather than a
//! global FIFO queue.
//!
//! When the wait exceeds its budget the acquisition releases its own slot
//! (so whoever queued behind it is not stuck) and fails with
//! [`CommonError::LockTimeout`]. After such a forced release, ordering among
//! the remaining waiters is unspecified.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CommonError;

type SlotTable = Arc<Mutex<HashMap<String, watch::Receiver<bool>>>>;

/// Mutex table scoped to string keys
///
/// Clones share the same table. Separate `KeyedMutex::new()` instances never
/// contend with each other.
#[derive(Clone, Default)]
pub struct KeyedMutex {
    slots: SlotTable,
}

impl KeyedMutex {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting at most `timeout` for the
    /// previous holder to release.
    ///
    /// # Errors
    ///
    /// Returns [`CommonError::LockTimeout`] when the predecessor did not
    /// release in time. The slot registered by this call is released before
    /// returning, so the next acquirer is not blocked by it.
    pub async fn acquire(&self, key: &str, timeout: Duration) -> Result<KeyedLockGuard, CommonError> {
        let (release, marker) = watch::channel(false);
        let previous = self.slots.lock().insert(key.to_owned(), marker.clone());

        let guard = KeyedLockGuard {
            key: key.to_owned(),
            slots: Arc::clone(&self.slots),
            marker,
            release,
        };

        if let Some(mut previous) = previous {
            debug!(key, ?timeout, "waiting for previous lock holder");
            // A dropped sender counts as a release.
            let wait = async { previous.wait_for(|released| *released).await.map(|_| ()) };
            if tokio::time::timeout(timeout, wait).await.is_err() {
                debug!(key, ?timeout, "lock wait timed out; forcing release");
                guard.release();
                return Err(CommonError::lock_timeout(key, timeout));
            }
        }

        debug!(key, "lock acquired");
        Ok(guard)
    }

    /// Run `operation` while holding the lock for `key`.
    ///
    /// The future is not polled unless the lock is acquired. The lock is
    /// released when the operation finishes, whether it succeeded or not.
    ///
    /// # Errors
    ///
    /// Propagates the operation's error, or a lock timeout converted through
    /// `From<CommonError>`.
    pub async fn with_lock<F, T, E>(&self, key: &str, timeout: Duration, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<CommonError>,
    {
        let guard = self.acquire(key, timeout).await?;
        let result = operation.await;
        guard.release();
        result
    }

    /// Whether some acquisition currently occupies the slot for `key`
    pub fn is_locked(&self, key: &str) -> bool {
        self.slots.lock().get(key).is_some_and(|slot| !*slot.borrow())
    }

    /// Number of keys with a registered slot
    pub fn active_keys(&self) -> usize {
        self.slots.lock().len()
    }
}

impl fmt::Debug for KeyedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMutex").field("active_keys", &self.active_keys()).finish()
    }
}

/// Proof of holding the lock for one key
///
/// Dropping the guard releases the lock.
pub struct KeyedLockGuard {
    key: String,
    slots: SlotTable,
    marker: watch::Receiver<bool>,
    release: watch::Sender<bool>,
}

impl KeyedLockGuard {
    /// Key this guard protects
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock. Calling it more than once has no further effect.
    pub fn release(&self) {
        if self.release.send_replace(true) {
            return;
        }

        let mut slots = self.slots.lock();
        if slots.get(&self.key).is_some_and(|current| current.same_channel(&self.marker)) {
            slots.remove(&self.key);
        }
        drop(slots);

        debug!(key = %self.key, "lock released");
    }
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for KeyedLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLockGuard")
            .field("key", &self.key)
            .field("released", &*self.marker.borrow())
            .finish()
    }
}
