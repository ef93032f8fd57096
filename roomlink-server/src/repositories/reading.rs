use std::sync::Arc;

use async_trait::async_trait;
use roomlink_api::models::Reading;
use sqlx::Error;

use super::ReadingStore;
use crate::configs::Storage;
use crate::models::ReadingRecord;

pub struct ReadingRepository {
    storage: Arc<Storage>,
}

impl ReadingRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, reading: &Reading) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO sensor_log (timestamp, ldr, person_detected, fan_pwm, light_on, potentiometer)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reading.timestamp)
        .bind(reading.ldr)
        .bind(i64::from(reading.person_detected))
        .bind(reading.fan_pwm)
        .bind(i64::from(reading.light_on))
        .bind(reading.potentiometer)
        .execute(self.storage.get_pool())
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    // Latest N records, newest first
    pub async fn find_latest(&self, limit: i64) -> Result<Vec<ReadingRecord>, Error> {
        let records: Vec<ReadingRecord> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_log
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sensor_log")
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ReadingStore for ReadingRepository {
    async fn insert(&self, reading: &Reading) -> anyhow::Result<()> {
        self.create(reading).await?;

        Ok(())
    }
}
