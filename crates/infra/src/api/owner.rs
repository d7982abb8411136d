//! HTTP adapter for the vehicle API
//!
//! Paths live under `{api_base_url}/api/1/vehicles`. Responses are unwrapped
//! from their `response` envelope; non-success statuses go through
//! [`map_status_error`] so that 408 surfaces as "unreachable".

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use wakelink_core::VehicleApi;
use wakelink_domain::{RemoteError, VehicleCommand, VehicleConfig, VehicleError, VehicleRef};

use super::types::{CommandResultDto, Envelope, VehicleDto};
use crate::errors::{map_status_error, remote_from_reqwest};
use crate::http::HttpClient;

/// Client for the owner-facing vehicle API
#[derive(Debug, Clone)]
pub struct OwnerApiClient {
    http: HttpClient,
    base_url: Url,
}

impl OwnerApiClient {
    /// Create a client against `api_base_url` with the default transport
    pub fn new(api_base_url: &str) -> Result<Self, VehicleError> {
        Self::with_http(HttpClient::new()?, api_base_url)
    }

    /// Create a client against `api_base_url` with a preconfigured transport
    pub fn with_http(http: HttpClient, api_base_url: &str) -> Result<Self, VehicleError> {
        let mut base_url = Url::parse(api_base_url).map_err(|err| {
            VehicleError::Config(format!("Invalid API base URL '{api_base_url}': {err}"))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// Client for the endpoints configured (or defaulted) for `config`
    pub fn from_config(config: &VehicleConfig) -> Result<Self, VehicleError> {
        Self::new(&config.resolved_endpoints().api_base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|err| RemoteError::transport(format!("invalid request path '{path}': {err}")))
    }

    fn vehicle_url(&self, vehicle_id: &str, suffix: &str) -> Result<Url, RemoteError> {
        self.url(&format!("api/1/vehicles/{vehicle_id}/{suffix}"))
    }

    async fn send_unwrapped<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|err| remote_from_reqwest(&err))?;
        Ok(envelope.response)
    }
}

#[async_trait]
impl VehicleApi for OwnerApiClient {
    #[instrument(skip_all)]
    async fn list_vehicles(&self, auth_token: &str) -> Result<Vec<VehicleRef>, RemoteError> {
        let url = self.url("api/1/vehicles")?;
        let request = self.http.request(Method::GET, url).bearer_auth(auth_token);
        let vehicles: Vec<VehicleDto> = self.send_unwrapped(request).await?;
        debug!(count = vehicles.len(), "listed vehicles");

        vehicles.into_iter().map(VehicleDto::into_vehicle_ref).collect()
    }

    #[instrument(skip(self, auth_token))]
    async fn wake_up(&self, auth_token: &str, vehicle_id: &str) -> Result<(), RemoteError> {
        let url = self.vehicle_url(vehicle_id, "wake_up")?;
        let request = self.http.request(Method::POST, url).bearer_auth(auth_token);
        let _: Value = self.send_unwrapped(request).await?;
        Ok(())
    }

    #[instrument(skip(self, auth_token))]
    async fn vehicle_data(&self, auth_token: &str, vehicle_id: &str) -> Result<Value, RemoteError> {
        let url = self.vehicle_url(vehicle_id, "vehicle_data")?;
        let request = self.http.request(Method::GET, url).bearer_auth(auth_token);
        self.send_unwrapped(request).await
    }

    #[instrument(skip(self, auth_token, command), fields(endpoint = command.endpoint()))]
    async fn command(
        &self,
        auth_token: &str,
        vehicle_id: &str,
        command: &VehicleCommand,
    ) -> Result<(), RemoteError> {
        let url = self.vehicle_url(vehicle_id, &format!("command/{}", command.endpoint()))?;
        let request = self.http.request(Method::POST, url).bearer_auth(auth_token).json(&command.body());
        let outcome: CommandResultDto = self.send_unwrapped(request).await?;

        if outcome.result {
            Ok(())
        } else {
            Err(RemoteError::rejected(outcome.reason.unwrap_or_default()))
        }
    }
}
