//! Mapping from command-line actions to orchestrator calls

use clap::{Subcommand, ValueEnum};
use wakelink_domain::{TrunkSide, VehicleCommand};

/// Two-state switch argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Action {
    /// Show connectivity state of the vehicle
    Status,
    /// Wake the vehicle and wait until it is online
    Wake,
    /// Fetch and print telemetry
    Data,
    /// Lock the doors
    Lock,
    /// Unlock the doors
    Unlock,
    /// Open the rear trunk
    Trunk,
    /// Open the front trunk
    Frunk,
    ChargePortOpen,
    ChargePortClose,
    ChargeStart,
    ChargeStop,
    /// Set the charge limit in percent
    ChargeLimit {
        #[arg(value_parser = clap::value_parser!(u8).range(50..=100))]
        percent: u8,
    },
    /// Set the charging current in amps
    ChargingAmps {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=48))]
        amps: u32,
    },
    ClimateOn,
    ClimateOff,
    /// Set driver and passenger temperature in degrees Celsius
    Temps { celsius: f64 },
    /// Max defrost
    Defrost {
        #[arg(value_enum)]
        state: Toggle,
    },
    WheelHeater {
        #[arg(value_enum)]
        state: Toggle,
    },
    Sentry {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Enable keyless driving
    RemoteStart,
    /// Trigger HomeLink at the configured location, if the device is nearby
    Homelink,
}

impl Action {
    /// The plain vehicle command behind this action
    ///
    /// `None` for the read-only actions and for HomeLink, which needs the
    /// configured location and a proximity check.
    pub fn command(&self) -> Option<VehicleCommand> {
        let command = match *self {
            Self::Status | Self::Wake | Self::Data | Self::Homelink => return None,
            Self::Lock => VehicleCommand::DoorLock,
            Self::Unlock => VehicleCommand::DoorUnlock,
            Self::Trunk => VehicleCommand::ActuateTrunk { which: TrunkSide::Rear },
            Self::Frunk => VehicleCommand::ActuateTrunk { which: TrunkSide::Front },
            Self::ChargePortOpen => VehicleCommand::OpenChargePort,
            Self::ChargePortClose => VehicleCommand::CloseChargePort,
            Self::ChargeStart => VehicleCommand::StartCharge,
            Self::ChargeStop => VehicleCommand::StopCharge,
            Self::ChargeLimit { percent } => VehicleCommand::SetChargeLimit { percent },
            Self::ChargingAmps { amps } => VehicleCommand::SetChargingAmps { amps },
            Self::ClimateOn => VehicleCommand::ClimateStart,
            Self::ClimateOff => VehicleCommand::ClimateStop,
            Self::Temps { celsius } => VehicleCommand::SetTemps { driver: celsius, passenger: celsius },
            Self::Defrost { state } => VehicleCommand::MaxDefrost { on: state.is_on() },
            Self::WheelHeater { state } => VehicleCommand::SteeringWheelHeater { on: state.is_on() },
            Self::Sentry { state } => VehicleCommand::SentryMode { on: state.is_on() },
            Self::RemoteStart => VehicleCommand::RemoteStart,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        action: Action,
    }

    fn parse(args: &[&str]) -> Action {
        Harness::try_parse_from(std::iter::once("wakelink").chain(args.iter().copied())).unwrap().action
    }

    #[test]
    fn kebab_case_actions_map_to_commands() {
        assert_eq!(parse(&["frunk"]).command(), Some(VehicleCommand::ActuateTrunk { which: TrunkSide::Front }));
        assert_eq!(parse(&["charge-limit", "80"]).command(), Some(VehicleCommand::SetChargeLimit { percent: 80 }));
        assert_eq!(parse(&["sentry", "off"]).command(), Some(VehicleCommand::SentryMode { on: false }));
        assert_eq!(
            parse(&["temps", "21.5"]).command(),
            Some(VehicleCommand::SetTemps { driver: 21.5, passenger: 21.5 })
        );
    }

    #[test]
    fn read_only_actions_have_no_command() {
        assert_eq!(parse(&["status"]).command(), None);
        assert_eq!(parse(&["homelink"]).command(), None);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Harness::try_parse_from(["wakelink", "charge-limit", "20"]).is_err());
        assert!(Harness::try_parse_from(["wakelink", "defrost", "maybe"]).is_err());
    }
}
