//! Telemetry snapshot
//!
//! The vehicle-data payload is large and loosely specified, so the snapshot
//! keeps it as raw JSON and exposes typed accessors for the fields the
//! client actually reads. A refresh replaces the whole snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Point-in-time read of the full vehicle state
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    raw: Arc<Value>,
    fetched_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub fn new(raw: Value) -> Self {
        Self::at(raw, Utc::now())
    }

    pub fn at(raw: Value, fetched_at: DateTime<Utc>) -> Self {
        Self { raw: Arc::new(raw), fetched_at }
    }

    /// The payload exactly as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Look up a JSON pointer such as `/charge_state/battery_level`
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        self.raw.pointer(path)
    }

    fn u64_at(&self, path: &str) -> Option<u64> {
        self.pointer(path).and_then(Value::as_u64)
    }

    fn f64_at(&self, path: &str) -> Option<f64> {
        self.pointer(path).and_then(Value::as_f64)
    }

    fn bool_at(&self, path: &str) -> Option<bool> {
        self.pointer(path).and_then(Value::as_bool)
    }

    // Charging

    pub fn battery_level(&self) -> Option<u8> {
        self.u64_at("/charge_state/battery_level").and_then(|v| u8::try_from(v).ok())
    }

    pub fn charge_limit_soc(&self) -> Option<u8> {
        self.u64_at("/charge_state/charge_limit_soc").and_then(|v| u8::try_from(v).ok())
    }

    /// `Charging`, `Complete`, `Disconnected`, `Stopped`, ...
    pub fn charging_state(&self) -> Option<&str> {
        self.pointer("/charge_state/charging_state").and_then(Value::as_str)
    }

    pub fn is_charging(&self) -> bool {
        self.charging_state() == Some("Charging")
    }

    pub fn charge_port_door_open(&self) -> Option<bool> {
        self.bool_at("/charge_state/charge_port_door_open")
    }

    pub fn charge_current_request(&self) -> Option<u32> {
        self.u64_at("/charge_state/charge_current_request").and_then(|v| u32::try_from(v).ok())
    }

    // Body

    pub fn locked(&self) -> Option<bool> {
        self.bool_at("/vehicle_state/locked")
    }

    /// Rear trunk; the API reports 0 for closed and non-zero for open
    pub fn rear_trunk_open(&self) -> Option<bool> {
        self.u64_at("/vehicle_state/rt").map(|v| v != 0)
    }

    pub fn front_trunk_open(&self) -> Option<bool> {
        self.u64_at("/vehicle_state/ft").map(|v| v != 0)
    }

    pub fn sentry_mode(&self) -> Option<bool> {
        self.bool_at("/vehicle_state/sentry_mode")
    }

    pub fn homelink_nearby(&self) -> Option<bool> {
        self.bool_at("/vehicle_state/homelink_nearby")
    }

    // Climate

    pub fn is_climate_on(&self) -> Option<bool> {
        self.bool_at("/climate_state/is_climate_on")
    }

    pub fn inside_temp(&self) -> Option<f64> {
        self.f64_at("/climate_state/inside_temp")
    }

    pub fn driver_temp_setting(&self) -> Option<f64> {
        self.f64_at("/climate_state/driver_temp_setting")
    }

    pub fn is_front_defroster_on(&self) -> Option<bool> {
        self.bool_at("/climate_state/is_front_defroster_on")
    }

    pub fn steering_wheel_heater(&self) -> Option<bool> {
        self.bool_at("/climate_state/steering_wheel_heater")
    }
}
