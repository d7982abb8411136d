//! # Wakelink Domain
//!
//! Domain types for the vehicle-control client.
//!
//! This crate contains:
//! - Vehicle, telemetry and command types
//! - The orchestrator's error types and Result alias
//! - Configuration structures and tunable timings
//! - Domain constants
//!
//! ## Architecture
//! - Depends only on `wakelink-common` (foundation tier)
//! - No I/O, no async runtime
//! - Pure data structures shared by core, infra and the CLI

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
