//! Domain types and models

pub mod command;
pub mod event;
pub mod telemetry;
pub mod vehicle;

pub use command::{CommandContext, TrunkSide, VehicleCommand};
pub use event::VehicleEvent;
pub use telemetry::TelemetrySnapshot;
pub use vehicle::{ConnectivityState, VehicleRef};
