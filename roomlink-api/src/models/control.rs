use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of the legacy `POST /set_fan` route.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetFanRequest {
    /// Requested duty cycle, accepted range 0-255
    #[serde(default, deserialize_with = "coerce_int")]
    pub fan_speed: i64,
}

/// Body of the legacy `POST /toggle_light` route.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToggleLightRequest {
    #[serde(default, deserialize_with = "coerce_bool")]
    pub state: bool,
}

/// Body of `POST /control/fan`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlFanRequest {
    /// Requested duty cycle, accepted range 0-255
    #[serde(default, deserialize_with = "coerce_int")]
    pub speed: i64,
}

/// Body of `POST /control/light`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlLightRequest {
    /// `"on"` turns the light on, any other value turns it off
    #[serde(default)]
    #[cfg_attr(feature = "docs", schema(value_type = String))]
    pub state: Value,
}

impl ControlLightRequest {
    pub fn state_str(&self) -> &str {
        self.state.as_str().unwrap_or_default()
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    pub token: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Always `"success"` on a 2xx response
    pub status: String,
    /// Command that was relayed, e.g. `set_fan`
    pub command: String,
}

impl CommandResponse {
    pub fn success(command: impl Into<String>) -> Self {
        Self {
            status: String::from("success"),
            command: command.into(),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Integer field that also takes floats (truncated) and numeric strings.
fn coerce_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| D::Error::custom(format!("invalid integer {n}"))),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .ok_or_else(|| D::Error::custom(format!("invalid integer {s:?}")))
        }
        Some(other) => Err(D::Error::custom(format!("expected an integer, got {other}"))),
    }
}

/// Truthiness: numbers are true unless zero, strings unless empty or a
/// false-like word.
fn coerce_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(Value::String(s)) => {
            let s = s.trim().to_ascii_lowercase();
            Ok(!matches!(s.as_str(), "" | "0" | "false" | "off"))
        }
        Some(other) => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}
