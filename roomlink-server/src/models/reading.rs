use roomlink_api::models::Reading;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

/// One row of the append-only sensor log.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingRecord {
    pub id: i64,
    pub timestamp: OffsetDateTime,
    pub ldr: i64,
    /// 1 when a person was detected
    pub person_detected: i64,
    pub fan_pwm: i64,
    /// 1 when the light was on
    pub light_on: i64,
    pub potentiometer: i64,
}

impl From<ReadingRecord> for Reading {
    fn from(record: ReadingRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            ldr: record.ldr,
            person_detected: record.person_detected != 0,
            fan_pwm: record.fan_pwm,
            light_on: record.light_on != 0,
            potentiometer: record.potentiometer,
        }
    }
}

#[derive(Clone)]
pub struct ReadingTable;

impl Table for ReadingTable {
    fn name(&self) -> &'static str {
        "sensor_log"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TIMESTAMP NOT NULL,
                ldr INTEGER NOT NULL,
                person_detected INTEGER NOT NULL CHECK (person_detected IN (0, 1)),
                fan_pwm INTEGER NOT NULL,
                light_on INTEGER NOT NULL CHECK (light_on IN (0, 1)),
                potentiometer INTEGER NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_log;")
    }
}
