//! # Wakelink Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - HTTP client with timeout and retry
//! - Vehicle API and OAuth token adapters
//! - Configuration loading (environment and TOML)
//! - Logging bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `wakelink-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;

// Re-export commonly used items
pub use api::{OAuthTokenClient, OwnerApiClient};
pub use http::{HttpClient, HttpClientBuilder};
pub use logging::{init_logging, LogFormat};
