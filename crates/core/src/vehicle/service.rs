//! Vehicle API orchestrator
//!
//! [`VehicleService`] resolves and caches everything a remote command needs
//! (access token, vehicle id, connectivity) and sends commands without making
//! its callers wait on a sleeping car.
//!
//! Each read operation is a pipeline assembled once in [`VehicleService::new`]:
//!
//! ```text
//! auth         = memo(10s,   lock("auth",        exchange refresh token))
//! vehicle      = memo(20s,   find VIN in vehicle list)           force: ignore_cache
//! options      = memo(2.5s,  lock("options",     auth + vehicle)) force: ignore_cache
//! vehicle_data = memo(2.5s,  lock("vehicleData", options + fetch + emit)) force: ignore_cache
//! ```
//!
//! Locks are owned by the instance, so two services never serialize against
//! each other.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use wakelink_common::{
    Backoff, Clock, ErrorClassification, ErrorSeverity, EventChannel, KeyedMutex, SubscriptionId,
    TokioClock, TtlMemo,
};
use wakelink_domain::constants::{LOCK_AUTH, LOCK_OPTIONS, LOCK_VEHICLE_DATA};
use wakelink_domain::{
    CommandContext, RemoteError, Result, TelemetrySnapshot, Timings, VehicleCommand, VehicleConfig,
    VehicleError, VehicleEvent, VehicleRef,
};

use super::dispatch::{Dispatch, PhaseReport, PhaseStatus};
use super::ports::{TokenExchange, VehicleApi};
use super::session::AuthSession;

/// Cache behaviour for a single read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bypass the cache window and hit the remote API
    pub ignore_cache: bool,
}

impl FetchOptions {
    /// Serve from cache when fresh
    pub const fn cached() -> Self {
        Self { ignore_cache: false }
    }

    /// Always refresh
    pub const fn fresh() -> Self {
        Self { ignore_cache: true }
    }
}

struct Inner {
    config: VehicleConfig,
    timings: Timings,
    backoff: Backoff,
    token_exchange: Arc<dyn TokenExchange>,
    api: Arc<dyn VehicleApi>,
    clock: Arc<dyn Clock>,
    session: Mutex<AuthSession>,
    locks: KeyedMutex,
    events: EventChannel<VehicleEvent>,
    last_vehicle: Mutex<Option<VehicleRef>>,
    latest_telemetry: Mutex<Option<TelemetrySnapshot>>,
}

impl Inner {
    /// Run one remote call, normalizing and logging its failure
    ///
    /// The log level follows the normalized error's severity, so an
    /// unreachable vehicle is reported at info.
    async fn invoke<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, RemoteError>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let normalized = VehicleError::remote(operation, &err);
                let severity = normalized.severity();
                match severity {
                    ErrorSeverity::Info => {
                        info!(operation, %severity, error = %err, "Vehicle unreachable");
                    }
                    ErrorSeverity::Warning => {
                        warn!(operation, %severity, error = %err, "Remote call failed");
                    }
                    ErrorSeverity::Error | ErrorSeverity::Critical => {
                        error!(operation, %severity, error = %err, "Remote call failed");
                    }
                }
                Err(normalized)
            }
        }
    }

    async fn access_token(&self) -> Result<String> {
        {
            let session = self.session.lock();
            if let Some(err) = session.sticky_error() {
                return Err(err.clone());
            }
            if let Some(token) = session.valid_token(self.clock.now()) {
                return Ok(token.to_owned());
            }
        }

        debug!(region = %self.config.region, "Exchanging refresh token");
        match self.token_exchange.exchange(&self.config.refresh_token, self.config.region).await {
            Ok(issued) => {
                let lifetime = issued.expires_in.saturating_sub(self.timings.token_expiry_margin);
                let expires_at = self.clock.now() + lifetime;
                self.session.lock().store(issued.access_token.clone(), expires_at);
                info!(valid_for = ?lifetime, "Access token refreshed");
                Ok(issued.access_token)
            }
            Err(err) => {
                let failure = VehicleError::Auth(err.to_string());
                self.session.lock().fail(failure.clone());
                error!(error = %err, "Token exchange failed; further refreshes disabled");
                Err(failure)
            }
        }
    }

    async fn find_vehicle(&self, auth_token: &str) -> Result<VehicleRef> {
        let vehicles = self.invoke("list_vehicles", self.api.list_vehicles(auth_token)).await?;
        let vin = &self.config.vin;

        match vehicles.iter().find(|vehicle| &vehicle.vin == vin) {
            Some(vehicle) => {
                debug!(%vin, id = %vehicle.id, state = %vehicle.state, "Vehicle resolved");
                *self.last_vehicle.lock() = Some(vehicle.clone());
                Ok(vehicle.clone())
            }
            None => {
                let available: Vec<String> = vehicles.into_iter().map(|vehicle| vehicle.vin).collect();
                error!(%vin, ?available, "Configured VIN not found on account");
                Err(VehicleError::VehicleNotFound { vin: vin.clone(), available })
            }
        }
    }

    async fn fetch_telemetry(&self, ctx: &CommandContext) -> Result<TelemetrySnapshot> {
        let vehicle_id = ctx.vehicle_id()?;
        let raw = self.invoke("vehicle_data", self.api.vehicle_data(&ctx.auth_token, vehicle_id)).await?;
        let snapshot = TelemetrySnapshot::new(raw);

        *self.latest_telemetry.lock() = Some(snapshot.clone());
        debug!(subscribers = self.events.subscriber_count(), "Telemetry updated");
        self.events.emit(&VehicleEvent::TelemetryUpdated(snapshot.clone()));
        Ok(snapshot)
    }
}

/// Orchestrator for one configured vehicle
///
/// Cheap to clone; clones share caches, locks, session and subscribers.
#[derive(Clone)]
pub struct VehicleService {
    inner: Arc<Inner>,
    auth: TtlMemo<(), String, VehicleError>,
    vehicle: TtlMemo<FetchOptions, VehicleRef, VehicleError>,
    options: TtlMemo<FetchOptions, CommandContext, VehicleError>,
    vehicle_data: TtlMemo<FetchOptions, Option<TelemetrySnapshot>, VehicleError>,
}

impl VehicleService {
    /// Validate `config` and assemble the operation pipelines
    ///
    /// # Errors
    /// Returns `VehicleError::Config` when the configuration is incomplete.
    pub fn new(
        config: VehicleConfig,
        timings: Timings,
        token_exchange: Arc<dyn TokenExchange>,
        api: Arc<dyn VehicleApi>,
    ) -> Result<Self> {
        config.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(TokioClock);
        let inner = Arc::new(Inner {
            backoff: Backoff::capped_exponential(
                timings.wake_initial_delay,
                timings.wake_backoff_factor,
                timings.wake_max_delay,
            ),
            config,
            timings,
            token_exchange,
            api,
            clock: Arc::clone(&clock),
            session: Mutex::new(AuthSession::default()),
            locks: KeyedMutex::new(),
            events: EventChannel::new(),
            last_vehicle: Mutex::new(None),
            latest_telemetry: Mutex::new(None),
        });
        let lock_timeout = timings.lock_timeout;

        let auth = {
            let inner = Arc::clone(&inner);
            TtlMemo::new("auth", timings.auth_ttl, move |()| {
                let inner = Arc::clone(&inner);
                async move { inner.locks.with_lock(LOCK_AUTH, lock_timeout, inner.access_token()).await }
            })
            .with_clock(Arc::clone(&clock))
        };

        let vehicle = {
            let inner = Arc::clone(&inner);
            let auth = auth.clone();
            TtlMemo::new("vehicle", timings.vehicle_ttl, move |_: FetchOptions| {
                let inner = Arc::clone(&inner);
                let auth = auth.clone();
                async move {
                    let token = auth.call(()).await?;
                    inner.find_vehicle(&token).await
                }
            })
            .with_force(|fetch: &FetchOptions| fetch.ignore_cache)
            .with_clock(Arc::clone(&clock))
        };

        let options = {
            let inner = Arc::clone(&inner);
            let auth = auth.clone();
            let vehicle = vehicle.clone();
            TtlMemo::new("options", timings.options_ttl, move |_: FetchOptions| {
                let inner = Arc::clone(&inner);
                let auth = auth.clone();
                let vehicle = vehicle.clone();
                async move {
                    inner
                        .locks
                        .with_lock(LOCK_OPTIONS, lock_timeout, async {
                            let token = auth.call(()).await?;
                            match vehicle.call(FetchOptions::cached()).await {
                                Ok(found) => {
                                    Ok(CommandContext::new(token, Some(found.id.clone()), found.is_online()))
                                }
                                Err(err @ (VehicleError::VehicleNotFound { .. }
                                | VehicleError::RemoteCommand { .. })) => {
                                    warn!(error = %err, "No vehicle resolved; treating as offline");
                                    Ok(CommandContext::new(token, None, false))
                                }
                                Err(err) => Err(err),
                            }
                        })
                        .await
                }
            })
            .with_force(|fetch: &FetchOptions| fetch.ignore_cache)
            .with_clock(Arc::clone(&clock))
        };

        let vehicle_data = {
            let inner = Arc::clone(&inner);
            let options = options.clone();
            TtlMemo::new("vehicleData", timings.vehicle_data_ttl, move |fetch: FetchOptions| {
                let inner = Arc::clone(&inner);
                let options = options.clone();
                async move {
                    inner
                        .locks
                        .with_lock(LOCK_VEHICLE_DATA, lock_timeout, async {
                            let ctx = options.call(fetch).await?;
                            if !ctx.is_online {
                                debug!("Vehicle not online; skipping telemetry fetch");
                                return Ok(None);
                            }
                            inner.fetch_telemetry(&ctx).await.map(Some)
                        })
                        .await
                }
            })
            .with_force(|fetch: &FetchOptions| fetch.ignore_cache)
            .with_clock(Arc::clone(&clock))
        };

        Ok(Self { inner, auth, vehicle, options, vehicle_data })
    }

    /// Current access token, exchanging the refresh token when needed
    ///
    /// # Errors
    /// `VehicleError::Auth` on exchange failure, and on every call after one.
    pub async fn get_auth_token(&self) -> Result<String> {
        self.auth.call(()).await
    }

    /// The configured vehicle as listed on the account
    ///
    /// # Errors
    /// `VehicleError::VehicleNotFound` when the VIN is not on the account.
    pub async fn get_vehicle(&self, fetch: FetchOptions) -> Result<VehicleRef> {
        self.vehicle.call(fetch).await
    }

    /// Context for remote calls
    ///
    /// A vehicle that cannot be resolved yields an offline context without
    /// an id instead of an error.
    pub async fn get_options(&self, fetch: FetchOptions) -> Result<CommandContext> {
        self.options.call(fetch).await
    }

    /// Whether the vehicle currently reports itself online
    pub async fn is_connected(&self) -> Result<bool> {
        self.get_vehicle(FetchOptions::cached()).await.map(|vehicle| vehicle.is_online())
    }

    /// Wake the vehicle and poll until it reports online
    ///
    /// Returns immediately when `ctx` is already online. Poll waits follow
    /// the configured backoff (2s, 4s, 8s, 10s, 10s, ... by default), the
    /// last one shortened so the final poll lands on the budget boundary.
    ///
    /// # Errors
    /// `VehicleError::WakeTimeout` when the budget runs out; the wake
    /// request's own failure; any non-retryable lookup failure.
    pub async fn wake_up(&self, ctx: &CommandContext) -> Result<()> {
        if ctx.is_online {
            return Ok(());
        }

        let vehicle_id = ctx.vehicle_id()?;
        self.invoke("wake_up", self.inner.api.wake_up(&ctx.auth_token, vehicle_id)).await?;

        let budget = self.inner.config.wake_budget();
        let started = self.inner.clock.now();
        let mut round = 0u32;
        info!(vehicle_id, ?budget, "Wake requested; polling for online state");

        loop {
            let remaining = budget.saturating_sub(self.inner.clock.elapsed_since(started));
            tokio::time::sleep(self.inner.backoff.delay(round).min(remaining)).await;
            round = round.saturating_add(1);

            match self.get_vehicle(FetchOptions::fresh()).await {
                Ok(vehicle) if vehicle.is_online() => {
                    info!(vehicle_id, rounds = round, "Vehicle is online");
                    return Ok(());
                }
                Ok(vehicle) => debug!(vehicle_id, state = %vehicle.state, round, "Still waiting"),
                Err(err) if err.is_retryable() => {
                    warn!(vehicle_id, error = %err, round, "Poll failed; will retry");
                }
                Err(err) => return Err(err),
            }

            let waited = self.inner.clock.elapsed_since(started);
            if waited >= budget {
                warn!(vehicle_id, ?waited, "Vehicle did not wake within budget");
                return Err(VehicleError::WakeTimeout { waited });
            }
        }
    }

    /// Full telemetry, or `None` when the vehicle is not online
    ///
    /// A successful fetch replaces the latest snapshot and notifies
    /// subscribers.
    pub async fn get_vehicle_data(&self, fetch: FetchOptions) -> Result<Option<TelemetrySnapshot>> {
        self.vehicle_data.call(fetch).await
    }

    /// Send one command in the foreground; failures propagate
    pub async fn command(&self, ctx: &CommandContext, command: &VehicleCommand) -> Result<()> {
        let vehicle_id = ctx.vehicle_id()?;
        debug!(vehicle_id, %command, "Sending command");
        self.invoke(command.endpoint(), self.inner.api.command(&ctx.auth_token, vehicle_id, command))
            .await
    }

    /// Low-level remote call with error normalization
    ///
    /// HTTP 408 is logged at info (vehicle unreachable), everything else at
    /// error. The error is returned to the caller either way.
    pub async fn invoke<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, RemoteError>>,
    {
        self.inner.invoke(operation, call).await
    }

    /// Wake if needed, run `command`, then refresh telemetry
    ///
    /// Options are resolved up front (fresh) and their failure propagates.
    /// The three phases then run on a spawned task:
    /// 1. wake, when offline; a failure ends the sequence
    /// 2. `command`; a failure is logged and the sequence continues
    /// 3. forced telemetry refresh; a failure is logged
    ///
    /// The caller waits at most the dispatch deadline. If it passes first,
    /// [`Dispatch::Detached`] is returned and the task keeps running.
    pub async fn wake_and_command<F, Fut>(&self, command: F) -> Result<Dispatch>
    where
        F: FnOnce(VehicleService, CommandContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let ctx = self.get_options(FetchOptions::fresh()).await?;
        let service = self.clone();
        let mut handle = tokio::spawn(async move { service.run_phases(ctx, command).await });

        let deadline = self.inner.timings.dispatch_deadline;
        match tokio::time::timeout(deadline, &mut handle).await {
            Ok(joined) => joined
                .map(Dispatch::Completed)
                .map_err(|err| VehicleError::Internal(format!("dispatch task failed: {err}"))),
            Err(_) => {
                info!(?deadline, "Command still running; returning before completion");
                Ok(Dispatch::Detached(handle))
            }
        }
    }

    /// [`wake_and_command`](Self::wake_and_command) for a single [`VehicleCommand`]
    pub async fn dispatch(&self, command: VehicleCommand) -> Result<Dispatch> {
        self.wake_and_command(move |service, ctx| async move { service.command(&ctx, &command).await })
            .await
    }

    async fn run_phases<F, Fut>(&self, mut ctx: CommandContext, command: F) -> PhaseReport
    where
        F: FnOnce(VehicleService, CommandContext) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut report = PhaseReport::default();

        if !ctx.is_online {
            match self.wake_up(&ctx).await {
                Ok(()) => {
                    report.wake = PhaseStatus::Succeeded;
                    ctx.is_online = true;
                }
                Err(err) => {
                    error!(error = %err, "Wake failed; command and refresh skipped");
                    report.wake = PhaseStatus::Failed(err);
                    return report;
                }
            }
        }

        let outcome = command(self.clone(), ctx).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "Command failed; refreshing telemetry anyway");
        }
        report.command = PhaseStatus::from_result(&outcome);

        let refreshed = self.get_vehicle_data(FetchOptions::fresh()).await;
        if let Err(err) = &refreshed {
            warn!(error = %err, "Telemetry refresh after command failed");
        }
        report.refresh = PhaseStatus::from_result(&refreshed);

        report
    }

    /// Receive every telemetry update from now on
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&VehicleEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Last successfully fetched snapshot
    pub fn latest_telemetry(&self) -> Option<TelemetrySnapshot> {
        self.inner.latest_telemetry.lock().clone()
    }

    /// Last resolved vehicle
    pub fn last_vehicle(&self) -> Option<VehicleRef> {
        self.inner.last_vehicle.lock().clone()
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.inner.config
    }

    pub fn timings(&self) -> &Timings {
        &self.inner.timings
    }
}

impl std::fmt::Debug for VehicleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleService")
            .field("config", &self.inner.config)
            .field("locks", &self.inner.locks)
            .field("events", &self.inner.events)
            .finish_non_exhaustive()
    }
}
