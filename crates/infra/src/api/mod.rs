//! Adapters for the remote vehicle cloud
//!
//! [`OwnerApiClient`] implements the core `VehicleApi` port and
//! [`OAuthTokenClient`] implements `TokenExchange`.

mod owner;
mod token;
mod types;

pub use owner::OwnerApiClient;
pub use token::OAuthTokenClient;
