//! Wakelink CLI
//!
//! Runs one action against the configured vehicle and exits.

mod action;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use wakelink_core::{FetchOptions, PhaseReport, PhaseStatus, VehicleService};
use wakelink_domain::{Timings, VehicleCommand, VehicleError, VehicleEvent};
use wakelink_infra::config::loader;
use wakelink_infra::{init_logging, LogFormat, OAuthTokenClient, OwnerApiClient};

use crate::action::Action;

#[derive(Parser)]
#[command(name = "wakelink", version)]
#[command(about = "Control a connected vehicle through its cloud API", long_about = None)]
struct Args {
    /// Config file (TOML or JSON); environment variables are tried first otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    action: Action,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(if args.json_logs { LogFormat::Json } else { LogFormat::Text }) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = match args.config {
        Some(path) => loader::load_from_file(Some(path)),
        None => loader::load(),
    }
    .context("loading configuration")?;

    let tokens = OAuthTokenClient::from_config(&config)?;
    let api = OwnerApiClient::from_config(&config)?;
    let service = VehicleService::new(config, Timings::default(), Arc::new(tokens), Arc::new(api))?;

    service.subscribe(|event: &VehicleEvent| match event {
        VehicleEvent::TelemetryUpdated(snapshot) => println!(
            "telemetry: battery {}%, locked {}, climate {}",
            display(snapshot.battery_level()),
            display(snapshot.locked()),
            display(snapshot.is_climate_on()),
        ),
    });

    match args.action {
        Action::Status => {
            let vehicle = service.get_vehicle(FetchOptions::fresh()).await?;
            println!("{} ({}): {}", vehicle.display_name.as_deref().unwrap_or("vehicle"), vehicle.vin, vehicle.state);
        }
        Action::Wake => {
            let ctx = service.get_options(FetchOptions::fresh()).await?;
            service.wake_up(&ctx).await?;
            println!("vehicle is online");
        }
        Action::Data => match service.get_vehicle_data(FetchOptions::fresh()).await? {
            Some(snapshot) => println!("{:#}", snapshot.raw()),
            None => println!("vehicle is not online; no telemetry"),
        },
        Action::Homelink => homelink(&service).await?,
        other => {
            let Some(command) = other.command() else {
                bail!("action has no vehicle command");
            };
            let report = service.dispatch(command).await?.finish().await?;
            report_outcome(&report)?;
        }
    }

    Ok(())
}

/// Trigger HomeLink only when fresh telemetry shows the device in range
async fn homelink(service: &VehicleService) -> anyhow::Result<()> {
    let Some((latitude, longitude)) = service.config().homelink_location() else {
        bail!("HomeLink needs latitude and longitude in the configuration");
    };

    let dispatch = service
        .wake_and_command(move |service, ctx| async move {
            let nearby = service
                .get_vehicle_data(FetchOptions::fresh())
                .await?
                .and_then(|snapshot| snapshot.homelink_nearby())
                .unwrap_or(false);
            if !nearby {
                info!("HomeLink device not nearby; trigger skipped");
                return Err(VehicleError::RemoteCommand {
                    operation: "trigger_homelink".to_string(),
                    unreachable: false,
                    message: "HomeLink device not nearby".to_string(),
                });
            }
            service.command(&ctx, &VehicleCommand::TriggerHomelink { latitude, longitude }).await
        })
        .await?;

    report_outcome(&dispatch.finish().await?)
}

fn report_outcome(report: &PhaseReport) -> anyhow::Result<()> {
    for (phase, status) in [("wake", &report.wake), ("command", &report.command), ("refresh", &report.refresh)] {
        match status {
            PhaseStatus::Skipped => {}
            PhaseStatus::Succeeded => println!("{phase}: ok"),
            PhaseStatus::Failed(err) => println!("{phase}: failed ({err})"),
        }
    }

    if report.command.is_failed() || report.wake.is_failed() {
        bail!("command did not complete");
    }
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
