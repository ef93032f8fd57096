mod reading;

pub use reading::ReadingRepository;

use async_trait::async_trait;
use roomlink_api::models::Reading;

/// Append-only log of normalized readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert(&self, reading: &Reading) -> anyhow::Result<()>;
}
