//! Vehicle identity and connectivity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connectivity as reported by the vehicle list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Online,
    Asleep,
    /// `offline`, `waking` and anything else the API may report
    #[serde(other)]
    Other,
}

impl ConnectivityState {
    pub fn from_wire(state: &str) -> Self {
        match state {
            "online" => Self::Online,
            "asleep" => Self::Asleep,
            _ => Self::Other,
        }
    }

    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Asleep => f.write_str("asleep"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// The tracked vehicle, resolved from the account's vehicle list by VIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRef {
    pub id: String,
    pub vin: String,
    pub state: ConnectivityState,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl VehicleRef {
    pub fn new(id: impl Into<String>, vin: impl Into<String>, state: ConnectivityState) -> Self {
        Self { id: id.into(), vin: vin.into(), state, display_name: None }
    }

    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_states_map_to_other() {
        assert_eq!(ConnectivityState::from_wire("online"), ConnectivityState::Online);
        assert_eq!(ConnectivityState::from_wire("asleep"), ConnectivityState::Asleep);
        assert_eq!(ConnectivityState::from_wire("offline"), ConnectivityState::Other);

        let parsed: ConnectivityState = serde_json::from_str("\"waking\"").unwrap();
        assert_eq!(parsed, ConnectivityState::Other);
    }
}
