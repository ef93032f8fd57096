//! Wire contract of the room controller's own HTTP surface.
//!
//! The firmware is loose about its JSON: fields can be missing, and the PIR
//! field is free text. [`SensorPayload`] therefore accepts any shape for each
//! field and keeps only values of the expected type.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// PIR text reported when motion is seen.
pub const PIR_DETECTED: &str = "Person Detected";
/// PIR text reported when the room is empty.
pub const PIR_NOT_DETECTED: &str = "Not Detected";

/// Body of `GET /sensors`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPayload {
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub ldr: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub pir: Option<String>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub pot: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub fan_pwm: Option<i64>,
    /// `0` means the light is on.
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub light_state: Option<i64>,
}

/// Body of `POST /set_fan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetFanBody {
    pub fan_speed: u8,
}

/// Body of `POST /toggle_light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStateBody {
    pub state: bool,
}

/// Routes exposed by the device.
pub mod routes {
    pub const SENSORS: &str = "/sensors";
    pub const SET_FAN: &str = "/set_fan";
    pub const TOGGLE_LIGHT: &str = "/toggle_light";
    pub const TOGGLE_LDR: &str = "/toggle_ldr";
    pub const TURN_ON_PIN6: &str = "/turn_on_pin6";
    pub const TURN_OFF_PIN6: &str = "/turn_off_pin6";
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| value.as_i64()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| value.as_str().map(str::to_owned)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_payload() {
        let payload: SensorPayload = serde_json::from_value(json!({
            "ldr": 512,
            "pir": "Person Detected",
            "pot": 300,
            "fan_pwm": 128,
            "light_state": 0
        }))
        .unwrap();

        assert_eq!(payload.ldr, Some(512));
        assert_eq!(payload.pir.as_deref(), Some(PIR_DETECTED));
        assert_eq!(payload.pot, Some(300));
        assert_eq!(payload.fan_pwm, Some(128));
        assert_eq!(payload.light_state, Some(0));
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let payload: SensorPayload = serde_json::from_value(json!({
            "ldr": "bright",
            "pir": 1,
            "fan_pwm": null,
            "extra": true
        }))
        .unwrap();

        assert_eq!(payload, SensorPayload::default());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_str::<SensorPayload>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<SensorPayload>("not json").is_err());
    }
}
