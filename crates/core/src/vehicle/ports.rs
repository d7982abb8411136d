//! Port interfaces for the remote vehicle cloud
//!
//! These traits define the boundary between the orchestrator and the HTTP
//! adapters in `wakelink-infra`. Implementations report failures as
//! [`RemoteError`]; the orchestrator normalizes and logs them.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use wakelink_domain::{Region, RemoteError, VehicleCommand, VehicleRef};

/// Access token issued by a refresh-token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime as reported by the issuer
    pub expires_in: Duration,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchanges the long-lived refresh token for a short-lived access token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Perform one exchange against the token endpoint for `region`
    async fn exchange(&self, refresh_token: &str, region: Region) -> Result<IssuedToken, RemoteError>;
}

/// Remote operations on the account's vehicles
#[async_trait]
pub trait VehicleApi: Send + Sync {
    /// List every vehicle on the account
    async fn list_vehicles(&self, auth_token: &str) -> Result<Vec<VehicleRef>, RemoteError>;

    /// Ask a sleeping vehicle to wake up; returns once the request is accepted
    async fn wake_up(&self, auth_token: &str, vehicle_id: &str) -> Result<(), RemoteError>;

    /// Fetch the full telemetry payload
    async fn vehicle_data(&self, auth_token: &str, vehicle_id: &str) -> Result<Value, RemoteError>;

    /// Send one command
    async fn command(
        &self,
        auth_token: &str,
        vehicle_id: &str,
        command: &VehicleCommand,
    ) -> Result<(), RemoteError>;
}
