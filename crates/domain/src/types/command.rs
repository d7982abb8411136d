//! Vehicle commands and the context needed to send them

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{Result, VehicleError};

/// Which trunk to actuate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrunkSide {
    /// Frunk
    Front,
    Rear,
}

impl TrunkSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
        }
    }
}

/// Every write action the client can send to the vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum VehicleCommand {
    DoorLock,
    DoorUnlock,
    OpenChargePort,
    CloseChargePort,
    StartCharge,
    StopCharge,
    SetChargeLimit { percent: u8 },
    SetChargingAmps { amps: u32 },
    ClimateStart,
    ClimateStop,
    /// Temperatures in degrees Celsius
    SetTemps { driver: f64, passenger: f64 },
    MaxDefrost { on: bool },
    SteeringWheelHeater { on: bool },
    SentryMode { on: bool },
    RemoteStart,
    TriggerHomelink { latitude: f64, longitude: f64 },
    ActuateTrunk { which: TrunkSide },
}

impl VehicleCommand {
    /// Remote endpoint name under `/command/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::DoorLock => "door_lock",
            Self::DoorUnlock => "door_unlock",
            Self::OpenChargePort => "charge_port_door_open",
            Self::CloseChargePort => "charge_port_door_close",
            Self::StartCharge => "charge_start",
            Self::StopCharge => "charge_stop",
            Self::SetChargeLimit { .. } => "set_charge_limit",
            Self::SetChargingAmps { .. } => "set_charging_amps",
            Self::ClimateStart => "auto_conditioning_start",
            Self::ClimateStop => "auto_conditioning_stop",
            Self::SetTemps { .. } => "set_temps",
            Self::MaxDefrost { .. } => "set_preconditioning_max",
            Self::SteeringWheelHeater { .. } => "remote_steering_wheel_heater_request",
            Self::SentryMode { .. } => "set_sentry_mode",
            Self::RemoteStart => "remote_start_drive",
            Self::TriggerHomelink { .. } => "trigger_homelink",
            Self::ActuateTrunk { .. } => "actuate_trunk",
        }
    }

    /// JSON request body; commands without parameters send `{}`
    pub fn body(&self) -> Value {
        match self {
            Self::SetChargeLimit { percent } => json!({ "percent": percent }),
            Self::SetChargingAmps { amps } => json!({ "charging_amps": amps }),
            Self::SetTemps { driver, passenger } => {
                json!({ "driver_temp": driver, "passenger_temp": passenger })
            }
            Self::MaxDefrost { on } | Self::SteeringWheelHeater { on } | Self::SentryMode { on } => {
                json!({ "on": on })
            }
            Self::TriggerHomelink { latitude, longitude } => {
                json!({ "lat": latitude, "lon": longitude })
            }
            Self::ActuateTrunk { which } => json!({ "which_trunk": which.as_str() }),
            _ => json!({}),
        }
    }
}

impl fmt::Display for VehicleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Credentials and identity for one round of remote calls
#[derive(Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub auth_token: String,
    /// `None` when the vehicle lookup failed
    pub vehicle_id: Option<String>,
    pub is_online: bool,
}

impl CommandContext {
    pub fn new(auth_token: impl Into<String>, vehicle_id: Option<String>, is_online: bool) -> Self {
        Self { auth_token: auth_token.into(), vehicle_id, is_online }
    }

    /// The resolved vehicle id
    ///
    /// # Errors
    /// Returns `VehicleError::VehicleUnresolved` when no vehicle matched.
    pub fn vehicle_id(&self) -> Result<&str> {
        self.vehicle_id.as_deref().ok_or(VehicleError::VehicleUnresolved)
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("auth_token", &"<redacted>")
            .field("vehicle_id", &self.vehicle_id)
            .field("is_online", &self.is_online)
            .finish()
    }
}
