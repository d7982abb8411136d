//! Error types used throughout the application
//!
//! [`VehicleError`] is what every orchestrator operation returns. It is
//! `Clone` because a memoized outcome, failures included, is handed to every
//! caller that shares it. [`RemoteError`] is the narrower error adapters
//! return for a single remote call.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use wakelink_common::{CommonError, ErrorClassification, ErrorSeverity};

/// Main error type for vehicle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VehicleError {
    /// Token exchange failed; sticky for the lifetime of the session
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Vehicle {vin} not found on account (available: [{}])", .available.join(", "))]
    VehicleNotFound { vin: String, available: Vec<String> },

    /// A command needed a vehicle id but the lookup did not resolve one
    #[error("Vehicle id is not resolved")]
    VehicleUnresolved,

    #[error("Vehicle did not come online within {waited:?}")]
    WakeTimeout { waited: Duration },

    #[error("Remote call '{operation}' failed{}: {message}", unreachable_note(.unreachable))]
    RemoteCommand { operation: String, unreachable: bool, message: String },

    #[error("Timed out after {timeout:?} waiting for lock '{key}'")]
    LockTimeout { key: String, timeout: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn unreachable_note(unreachable: &bool) -> &'static str {
    if *unreachable {
        " (vehicle unreachable)"
    } else {
        ""
    }
}

/// Result type alias for vehicle operations
pub type Result<T> = std::result::Result<T, VehicleError>;

impl VehicleError {
    /// Normalize a failed remote call into [`VehicleError::RemoteCommand`]
    pub fn remote(operation: impl Into<String>, err: &RemoteError) -> Self {
        Self::RemoteCommand {
            operation: operation.into(),
            unreachable: err.is_unreachable(),
            message: err.to_string(),
        }
    }

    /// Whether this is a remote failure caused by the vehicle being offline
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::RemoteCommand { unreachable: true, .. })
    }
}

impl ErrorClassification for VehicleError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteCommand { .. } | Self::LockTimeout { .. } | Self::WakeTimeout { .. } => true,
            Self::VehicleNotFound { .. } => true,
            Self::Auth(_) | Self::VehicleUnresolved | Self::Config(_) | Self::Internal(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RemoteCommand { unreachable: true, .. } => ErrorSeverity::Info,
            Self::LockTimeout { .. } | Self::WakeTimeout { .. } => ErrorSeverity::Warning,
            Self::RemoteCommand { .. }
            | Self::VehicleNotFound { .. }
            | Self::VehicleUnresolved
            | Self::Config(_) => ErrorSeverity::Error,
            Self::Auth(_) | Self::Internal(_) => ErrorSeverity::Critical,
        }
    }
}

impl From<CommonError> for VehicleError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::LockTimeout { key, timeout } => Self::LockTimeout { key, timeout },
        }
    }
}

/// Failure category of a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// HTTP 408: the vehicle is asleep or out of coverage
    Unreachable,
    /// Any other non-success HTTP status
    Http { status: u16 },
    /// The vehicle answered but refused the command
    Rejected { reason: String },
    /// Connection, TLS or timeout failure before a response arrived
    Transport,
    /// Response body did not have the expected shape
    Decode,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "vehicle unreachable"),
            Self::Http { status } => write!(f, "HTTP {status}"),
            Self::Rejected { reason } => write!(f, "rejected ({reason})"),
            Self::Transport => write!(f, "transport"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

/// Error returned by the remote ports
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Unreachable, message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Http { status }, message)
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected { reason: reason.into() }, "vehicle refused the command")
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Decode, message)
    }

    pub fn is_unreachable(&self) -> bool {
        self.kind == RemoteErrorKind::Unreachable
    }

    /// HTTP status, when the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            RemoteErrorKind::Unreachable => Some(crate::constants::HTTP_STATUS_UNREACHABLE),
            RemoteErrorKind::Http { status } => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_normalization_keeps_unreachable_flag() {
        let asleep = VehicleError::remote("vehicle_data", &RemoteError::unreachable("asleep"));
        assert!(asleep.is_unreachable());
        assert_eq!(asleep.severity(), ErrorSeverity::Info);
        assert_eq!(
            asleep.to_string(),
            "Remote call 'vehicle_data' failed (vehicle unreachable): vehicle unreachable: asleep"
        );

        let broken = VehicleError::remote("door_lock", &RemoteError::http(500, "boom"));
        assert!(!broken.is_unreachable());
        assert_eq!(broken.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_not_found_lists_available_vins() {
        let err = VehicleError::VehicleNotFound {
            vin: "5YJ3".into(),
            available: vec!["A1".into(), "B2".into()],
        };
        assert_eq!(err.to_string(), "Vehicle 5YJ3 not found on account (available: [A1, B2])");
    }

    #[test]
    fn test_common_error_conversion() {
        let lock: VehicleError =
            CommonError::lock_timeout("auth", Duration::from_secs(20)).into();
        assert_eq!(lock, VehicleError::LockTimeout { key: "auth".into(), timeout: Duration::from_secs(20) });
        assert_eq!(lock.severity(), ErrorSeverity::Warning);
        assert!(lock.is_retryable());
    }

    #[test]
    fn test_auth_is_critical_and_not_retryable() {
        let err = VehicleError::Auth("invalid_grant".into());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_remote_error_status() {
        assert_eq!(RemoteError::unreachable("x").status(), Some(408));
        assert_eq!(RemoteError::http(429, "slow down").status(), Some(429));
        assert_eq!(RemoteError::rejected("user_present").status(), None);
        assert_eq!(
            RemoteError::rejected("user_present").to_string(),
            "rejected (user_present): vehicle refused the command"
        );
    }
}
