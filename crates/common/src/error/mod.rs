//! Common error types and utilities shared by the Wakelink crates
//!
//! # Error Handling Architecture
//!
//! 1. **`CommonError`**: failures raised by the shared primitives in this
//!    crate (a keyed lock that could not be acquired in time).
//!
//! 2. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability and severity.
//!
//! 3. **`ErrorSeverity` enum**: a unified severity scale. Callers map it onto
//!    `tracing` levels so that expected conditions (an unreachable vehicle)
//!    do not page anyone while genuine failures do.
//!
//! ## Composition
//!
//! Crate-specific errors absorb `CommonError` through `From`, which is what
//! `KeyedMutex::with_lock` relies on:
//!
//! ```rust,ignore
//! impl From<CommonError> for MyError {
//!     fn from(err: CommonError) -> Self {
//!         match err {
//!             CommonError::LockTimeout { key, timeout } => Self::Busy { key, timeout },
//!         }
//!     }
//! }
//! ```
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Vehicle asleep / unreachable |
//! | **Warning** | Degraded but operational | Lock contention, timeouts |
//! | **Error** | Failure requiring attention | Remote call failures, bad config |
//! | **Critical** | Integrity or credentials at risk | Auth failures, internal bugs |

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the coordination primitives
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommonError {
    /// A keyed lock could not be acquired within its wait budget
    #[error("Timed out after {timeout:?} waiting for lock '{key}'")]
    LockTimeout { key: String, timeout: Duration },
}

impl CommonError {
    /// Create a lock timeout error
    pub fn lock_timeout<K: Into<String>>(key: K, timeout: Duration) -> Self {
        Self::LockTimeout { key: key.into(), timeout }
    }
}

/// Error classification trait for consistent error handling across crates
///
/// Implementors describe how an error should be treated without the caller
/// needing to match on concrete variants.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: timeouts, lock contention, a vehicle
    /// that has not woken up yet.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Drives the log level a failure is reported at.
    fn severity(&self) -> ErrorSeverity;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, expected in normal operation
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
