use serde::{Deserialize, Serialize};

use super::Reading;

/// Name of the push event carrying a new reading.
pub const SENSOR_UPDATE: &str = "sensor_update";

/// Frame pushed to WebSocket subscribers.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    SensorUpdate(Reading),
}
