//! # Wakelink Core
//!
//! Orchestration layer for one remote vehicle - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the token endpoint and the vehicle API
//! - `VehicleService`, which composes memoization, keyed locking and event
//!   broadcast into the vehicle operations
//! - Dispatch types describing the outcome of a background command
//!
//! ## Architecture Principles
//! - Only depends on `wakelink-common` and `wakelink-domain`
//! - No HTTP or filesystem code
//! - All remote access goes through the ports

pub mod vehicle;

pub use vehicle::dispatch::{Dispatch, PhaseReport, PhaseStatus};
pub use vehicle::ports::{IssuedToken, TokenExchange, VehicleApi};
pub use vehicle::service::{FetchOptions, VehicleService};
