//! Modular common utilities shared across Wakelink crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification, clock abstraction, backoff math
//! - `runtime`: async coordination primitives (event channel, keyed mutex,
//!   TTL memoizer)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod sync;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use sync::{
    EventChannel, KeyedLockGuard, KeyedMutex, MemoFuture, SubscriptionId, TtlMemo,
};
#[cfg(feature = "foundation")]
pub use time::{Backoff, Clock, MockClock};
#[cfg(feature = "runtime")]
pub use time::TokioClock;
