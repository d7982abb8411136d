//! Shared test helpers for `wakelink-core` integration tests.
//!
//! In-memory fakes for the two ports. Both record every call so tests can
//! assert on how often the orchestrator really went to the network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::Instant;
use wakelink_core::{IssuedToken, TokenExchange, VehicleApi, VehicleService};
use wakelink_domain::{
    ConnectivityState, Region, RemoteError, Timings, VehicleCommand, VehicleConfig, VehicleRef,
};

pub const VIN: &str = "5YJ3E1EA7KF000001";
pub const VEHICLE_ID: &str = "1492931337";

/// Fake token endpoint returning a fixed outcome
pub struct FakeTokenExchange {
    outcome: Mutex<Result<IssuedToken, RemoteError>>,
    calls: AtomicUsize,
}

impl FakeTokenExchange {
    pub fn issuing(lifetime: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Ok(IssuedToken {
                access_token: "access-1".to_string(),
                expires_in: lifetime,
            })),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Err(RemoteError::http(401, "invalid_grant"))),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_token(&self, token: &str) {
        if let Ok(issued) = &mut *self.outcome.lock() {
            issued.access_token = token.to_string();
        }
    }
}

#[async_trait]
impl TokenExchange for FakeTokenExchange {
    async fn exchange(&self, refresh_token: &str, _region: Region) -> Result<IssuedToken, RemoteError> {
        assert_eq!(refresh_token, "refresh-token");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().clone()
    }
}

/// Fake vehicle cloud with one (or no) vehicle
///
/// After `wake_up`, the vehicle turns online on the `wake_after_polls`-th
/// subsequent vehicle listing; `None` means it never wakes.
pub struct FakeVehicleApi {
    vehicles: Mutex<Vec<VehicleRef>>,
    wake_after_polls: Mutex<Option<usize>>,
    polls_since_wake: AtomicUsize,
    woken: Mutex<bool>,
    telemetry: Mutex<Value>,
    command_delay: Mutex<Duration>,
    command_failure: Mutex<Option<RemoteError>>,
    wake_failure: Mutex<Option<RemoteError>>,
    data_failure: Mutex<Option<RemoteError>>,
    list_calls: AtomicUsize,
    list_times: Mutex<Vec<Instant>>,
    wake_calls: AtomicUsize,
    data_calls: AtomicUsize,
    commands: Mutex<Vec<String>>,
    tokens_seen: Mutex<Vec<String>>,
}

impl FakeVehicleApi {
    pub fn with_vehicle(state: ConnectivityState) -> Arc<Self> {
        Arc::new(Self::build(vec![VehicleRef::new(VEHICLE_ID, VIN, state)]))
    }

    pub fn with_vehicles(vehicles: Vec<VehicleRef>) -> Arc<Self> {
        Arc::new(Self::build(vehicles))
    }

    fn build(vehicles: Vec<VehicleRef>) -> Self {
        Self {
            vehicles: Mutex::new(vehicles),
            wake_after_polls: Mutex::new(Some(1)),
            polls_since_wake: AtomicUsize::new(0),
            woken: Mutex::new(false),
            telemetry: Mutex::new(json!({
                "charge_state": { "battery_level": 64, "charge_limit_soc": 80 },
                "vehicle_state": { "locked": true, "rt": 0, "ft": 0 }
            })),
            command_delay: Mutex::new(Duration::ZERO),
            command_failure: Mutex::new(None),
            wake_failure: Mutex::new(None),
            data_failure: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            list_times: Mutex::new(Vec::new()),
            wake_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn wake_after_polls(&self, polls: Option<usize>) {
        *self.wake_after_polls.lock() = polls;
    }

    pub fn set_vehicles(&self, vehicles: Vec<VehicleRef>) {
        *self.vehicles.lock() = vehicles;
    }

    pub fn set_state(&self, state: ConnectivityState) {
        for vehicle in self.vehicles.lock().iter_mut() {
            vehicle.state = state;
        }
    }

    pub fn set_telemetry(&self, payload: Value) {
        *self.telemetry.lock() = payload;
    }

    pub fn delay_commands(&self, delay: Duration) {
        *self.command_delay.lock() = delay;
    }

    pub fn fail_commands(&self, err: RemoteError) {
        *self.command_failure.lock() = Some(err);
    }

    pub fn fail_wake(&self, err: RemoteError) {
        *self.wake_failure.lock() = Some(err);
    }

    pub fn fail_data(&self, err: RemoteError) {
        *self.data_failure.lock() = Some(err);
    }

    pub fn clear_failures(&self) {
        *self.command_failure.lock() = None;
        *self.wake_failure.lock() = None;
        *self.data_failure.lock() = None;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Offsets of every vehicle listing from `origin`, in whole seconds
    pub fn list_offsets_secs(&self, origin: Instant) -> Vec<u64> {
        self.list_times.lock().iter().map(|at| at.saturating_duration_since(origin).as_secs()).collect()
    }

    pub fn wake_calls(&self) -> usize {
        self.wake_calls.load(Ordering::SeqCst)
    }

    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().clone()
    }
}

#[async_trait]
impl VehicleApi for FakeVehicleApi {
    async fn list_vehicles(&self, auth_token: &str) -> Result<Vec<VehicleRef>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_times.lock().push(Instant::now());
        self.tokens_seen.lock().push(auth_token.to_string());

        if *self.woken.lock() {
            let polls = self.polls_since_wake.fetch_add(1, Ordering::SeqCst) + 1;
            if self.wake_after_polls.lock().is_some_and(|needed| polls >= needed) {
                self.set_state(ConnectivityState::Online);
            }
        }
        Ok(self.vehicles.lock().clone())
    }

    async fn wake_up(&self, _auth_token: &str, vehicle_id: &str) -> Result<(), RemoteError> {
        assert_eq!(vehicle_id, VEHICLE_ID);
        self.wake_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.wake_failure.lock().clone() {
            return Err(err);
        }
        *self.woken.lock() = true;
        Ok(())
    }

    async fn vehicle_data(&self, _auth_token: &str, vehicle_id: &str) -> Result<Value, RemoteError> {
        assert_eq!(vehicle_id, VEHICLE_ID);
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.data_failure.lock().clone() {
            return Err(err);
        }
        Ok(self.telemetry.lock().clone())
    }

    async fn command(
        &self,
        _auth_token: &str,
        vehicle_id: &str,
        command: &VehicleCommand,
    ) -> Result<(), RemoteError> {
        assert_eq!(vehicle_id, VEHICLE_ID);
        let delay = *self.command_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.command_failure.lock().clone() {
            return Err(err);
        }
        self.commands.lock().push(command.endpoint().to_string());
        Ok(())
    }
}

pub fn config() -> VehicleConfig {
    VehicleConfig::new(VIN, "refresh-token")
}

/// Service over the given fakes with default timings
pub fn service(tokens: &Arc<FakeTokenExchange>, api: &Arc<FakeVehicleApi>) -> VehicleService {
    service_with(config(), tokens, api)
}

pub fn service_with(
    config: VehicleConfig,
    tokens: &Arc<FakeTokenExchange>,
    api: &Arc<FakeVehicleApi>,
) -> VehicleService {
    VehicleService::new(
        config,
        Timings::default(),
        Arc::clone(tokens) as Arc<dyn TokenExchange>,
        Arc::clone(api) as Arc<dyn VehicleApi>,
    )
    .expect("valid test configuration")
}
