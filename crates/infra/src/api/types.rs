//! Wire shapes of the vehicle cloud

use serde::Deserialize;
use wakelink_domain::{ConnectivityState, RemoteError, VehicleRef};

/// Every vehicle API payload is wrapped in `{"response": ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub response: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VehicleDto {
    #[serde(default)]
    pub id_s: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    pub vin: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl VehicleDto {
    pub fn into_vehicle_ref(self) -> Result<VehicleRef, RemoteError> {
        let id = match (self.id_s, self.id) {
            (Some(id), _) if !id.is_empty() => id,
            (_, Some(id)) => id.to_string(),
            _ => return Err(RemoteError::decode(format!("vehicle {} has no id", self.vin))),
        };
        let state = self.state.as_deref().map(ConnectivityState::from_wire).unwrap_or(ConnectivityState::Other);

        Ok(VehicleRef { id, vin: self.vin, state, display_name: self.display_name })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommandResultDto {
    pub result: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_id_prefers_string_form() {
        let dto: VehicleDto = serde_json::from_str(
            r#"{"id": 1492931337, "id_s": "1492931337", "vin": "5YJ3E1EA0KF000001", "state": "asleep"}"#,
        )
        .unwrap();
        let vehicle = dto.into_vehicle_ref().unwrap();
        assert_eq!(vehicle.id, "1492931337");
        assert_eq!(vehicle.state, ConnectivityState::Asleep);
    }

    #[test]
    fn numeric_id_is_accepted_and_unknown_state_is_other() {
        let dto: VehicleDto =
            serde_json::from_str(r#"{"id": 42, "vin": "VIN", "state": "offline"}"#).unwrap();
        let vehicle = dto.into_vehicle_ref().unwrap();
        assert_eq!(vehicle.id, "42");
        assert_eq!(vehicle.state, ConnectivityState::Other);
    }

    #[test]
    fn missing_id_is_a_decode_error() {
        let dto: VehicleDto = serde_json::from_str(r#"{"vin": "VIN"}"#).unwrap();
        assert!(dto.into_vehicle_ref().is_err());
    }
}
