mod control;
mod status;
mod stream;

pub use control::*;
pub use status::*;
pub use stream::*;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One normalized snapshot of the room controller.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Capture time of the poll that produced this reading
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Light dependent resistor, sensor-native range
    pub ldr: i64,
    /// Motion sensor saw a person
    pub person_detected: bool,
    /// Fan duty cycle (0-255)
    pub fan_pwm: i64,
    /// Room light is on
    pub light_on: bool,
    /// Potentiometer, sensor-native range
    pub potentiometer: i64,
}

#[cfg_attr(feature = "docs", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "docs", into_params(parameter_in = Query))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Number of most recent readings to return
    pub limit: Option<u32>,
}
