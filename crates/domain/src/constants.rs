//! Domain constants
//!
//! Defaults for the orchestrator tunables and the lock keys it uses.

use std::time::Duration;

// Cache windows
pub const AUTH_TTL: Duration = Duration::from_secs(10);
pub const VEHICLE_TTL: Duration = Duration::from_secs(20);
pub const OPTIONS_TTL: Duration = Duration::from_millis(2500);
pub const VEHICLE_DATA_TTL: Duration = Duration::from_millis(2500);

// Lock keys and wait budget
pub const LOCK_AUTH: &str = "auth";
pub const LOCK_OPTIONS: &str = "options";
pub const LOCK_VEHICLE_DATA: &str = "vehicleData";
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(20);

// Command dispatch
pub const DISPATCH_DEADLINE: Duration = Duration::from_secs(5);

// Wake polling
pub const WAKE_INITIAL_DELAY: Duration = Duration::from_secs(2);
pub const WAKE_BACKOFF_FACTOR: u32 = 2;
pub const WAKE_MAX_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_WAIT_MINUTES: u64 = 1;

/// Subtracted from the issued token lifetime so a token is never used right
/// at its expiry
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// HTTP status the vehicle API returns when the car cannot be reached
pub const HTTP_STATUS_UNREACHABLE: u16 = 408;
