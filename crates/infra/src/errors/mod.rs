//! Conversions from transport errors into domain errors.

mod conversions;

pub use conversions::{map_status_error, remote_from_reqwest};
