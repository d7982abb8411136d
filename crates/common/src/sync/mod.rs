//! Async coordination primitives
//!
//! ## Submodules
//!
//! - **`events`**: synchronous multi-subscriber event channel
//! - **`keyed_mutex`**: named, per-key mutual exclusion with an acquisition
//!   timeout
//! - **`memo`**: TTL memoizer that coalesces concurrent calls onto one
//!   in-flight future
//!
//! The three compose: a memoized operation typically takes a keyed lock
//! inside its body and emits an event once fresh data arrives.

pub mod events;
pub mod keyed_mutex;
pub mod memo;

pub use events::{EventChannel, SubscriptionId};
pub use keyed_mutex::{KeyedLockGuard, KeyedMutex};
pub use memo::{MemoFuture, TtlMemo};
