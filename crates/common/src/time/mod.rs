//! Time abstractions
//!
//! - **[`clock`]**: monotonic clock trait with Tokio-aware and mock
//!   implementations
//! - **[`backoff`]**: capped exponential backoff schedule used by polling
//!   loops
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use wakelink_common::time::{Backoff, Clock, MockClock};
//!
//! let backoff = Backoff::capped_exponential(Duration::from_secs(2), 2, Duration::from_secs(10));
//! assert_eq!(backoff.delay(3), Duration::from_secs(10));
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

pub mod backoff;
pub mod clock;

pub use backoff::Backoff;
#[cfg(feature = "runtime")]
pub use clock::TokioClock;
pub use clock::{Clock, MockClock};
