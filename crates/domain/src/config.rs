//! Configuration structures
//!
//! [`VehicleConfig`] is what the operator supplies (usually through the
//! infra loader). [`Timings`] carries the orchestrator tunables; production
//! code uses the defaults and tests shrink or inspect them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{Result, VehicleError};

/// Regional routing flag for the vehicle cloud
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    China,
}

impl Region {
    /// Default endpoints for this region
    pub fn endpoints(self) -> Endpoints {
        match self {
            Self::Global => Endpoints {
                token_url: "https://auth.tesla.com/oauth2/v3/token".to_string(),
                api_base_url: "https://owner-api.teslamotors.com".to_string(),
            },
            Self::China => Endpoints {
                token_url: "https://auth.tesla.cn/oauth2/v3/token".to_string(),
                api_base_url: "https://owner-api.vn.cloud.tesla.cn".to_string(),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::China => "china",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = VehicleError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" | "" => Ok(Self::Global),
            "china" | "cn" => Ok(Self::China),
            other => Err(VehicleError::Config(format!("Unknown region '{other}'"))),
        }
    }
}

/// Remote endpoints used by the adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// OAuth token endpoint for the refresh-token exchange
    pub token_url: String,
    /// Base URL of the vehicle API (without the `/api/1` prefix)
    pub api_base_url: String,
}

/// Operator configuration for one vehicle
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleConfig {
    pub vin: String,
    pub refresh_token: String,
    #[serde(default)]
    pub region: Region,
    /// Wake budget in minutes
    #[serde(default = "default_wait_minutes")]
    pub wait_minutes: u64,
    /// HomeLink trigger location
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Overrides the region's default endpoints
    #[serde(default)]
    pub endpoints: Option<Endpoints>,
}

fn default_wait_minutes() -> u64 {
    constants::DEFAULT_WAIT_MINUTES
}

impl VehicleConfig {
    pub fn new(vin: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            refresh_token: refresh_token.into(),
            region: Region::default(),
            wait_minutes: constants::DEFAULT_WAIT_MINUTES,
            latitude: None,
            longitude: None,
            endpoints: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    #[must_use]
    pub fn with_wait_minutes(mut self, minutes: u64) -> Self {
        self.wait_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    #[must_use]
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Total time allowed for wake polling
    pub fn wake_budget(&self) -> Duration {
        Duration::from_secs(self.wait_minutes.saturating_mul(60))
    }

    /// Effective endpoints: the override if present, else the region default
    pub fn resolved_endpoints(&self) -> Endpoints {
        self.endpoints.clone().unwrap_or_else(|| self.region.endpoints())
    }

    /// Configured HomeLink location, when both coordinates are set
    pub fn homelink_location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Check required fields
    ///
    /// # Errors
    /// Returns `VehicleError::Config` for an empty VIN or refresh token, a
    /// zero wake budget, or out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if self.vin.trim().is_empty() {
            return Err(VehicleError::Config("vin must not be empty".to_string()));
        }
        if self.refresh_token.trim().is_empty() {
            return Err(VehicleError::Config("refresh_token must not be empty".to_string()));
        }
        if self.wait_minutes == 0 {
            return Err(VehicleError::Config("wait_minutes must be at least 1".to_string()));
        }
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(VehicleError::Config(format!("latitude {lat} out of range")));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(VehicleError::Config(format!("longitude {lon} out of range")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for VehicleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleConfig")
            .field("vin", &self.vin)
            .field("refresh_token", &"<redacted>")
            .field("region", &self.region)
            .field("wait_minutes", &self.wait_minutes)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Orchestrator tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub auth_ttl: Duration,
    pub vehicle_ttl: Duration,
    pub options_ttl: Duration,
    pub vehicle_data_ttl: Duration,
    pub lock_timeout: Duration,
    /// How long `wake_and_command` callers wait before the work detaches
    pub dispatch_deadline: Duration,
    pub wake_initial_delay: Duration,
    pub wake_backoff_factor: u32,
    pub wake_max_delay: Duration,
    pub token_expiry_margin: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            auth_ttl: constants::AUTH_TTL,
            vehicle_ttl: constants::VEHICLE_TTL,
            options_ttl: constants::OPTIONS_TTL,
            vehicle_data_ttl: constants::VEHICLE_DATA_TTL,
            lock_timeout: constants::LOCK_TIMEOUT,
            dispatch_deadline: constants::DISPATCH_DEADLINE,
            wake_initial_delay: constants::WAKE_INITIAL_DELAY,
            wake_backoff_factor: constants::WAKE_BACKOFF_FACTOR,
            wake_max_delay: constants::WAKE_MAX_DELAY,
            token_expiry_margin: constants::TOKEN_EXPIRY_MARGIN,
        }
    }
}
