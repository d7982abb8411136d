//! Events broadcast by the orchestrator

use super::telemetry::TelemetrySnapshot;

/// Closed set of outward notifications
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleEvent {
    /// A telemetry refresh succeeded; carries the new snapshot
    TelemetryUpdated(TelemetrySnapshot),
}
