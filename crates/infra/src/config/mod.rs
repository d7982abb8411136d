//! Configuration loading
//!
//! Builds a [`wakelink_domain::VehicleConfig`] from environment variables or
//! a JSON/TOML file.

pub mod loader;

pub use loader::{find_config_file, load, load_from_env, load_from_file};
