use roomlink_api::models::Reading;
use tokio::sync::RwLock;

/// Latest reading from the room controller.
///
/// Readers always see a whole reading; the poller swaps it under the write
/// lock.
#[derive(Default)]
pub struct StateCache {
    current: RwLock<Option<Reading>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Reading> {
        self.current.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.current.read().await.is_none()
    }

    /// Only the poller calls this.
    pub(crate) async fn replace(&self, reading: Reading) -> Option<Reading> {
        self.current.write().await.replace(reading)
    }
}
