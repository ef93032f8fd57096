use std::sync::Arc;
use std::time::Duration;

use roomlink_api::device::{PIR_DETECTED, PIR_NOT_DETECTED, SensorPayload};
use roomlink_api::models::{PollerState, PollerStatus, Reading};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::errors::DeviceError;
use crate::repositories::ReadingStore;
use crate::services::{Device, Fanout, StateCache};

/// Turns a raw device payload into a [`Reading`].
///
/// Missing fields fall back to `0`/`false`. Only the exact text
/// `"Person Detected"` counts as motion, and the device reports the light as
/// on with `light_state == 0`.
pub fn normalize(payload: &SensorPayload, timestamp: OffsetDateTime) -> Reading {
    let mut missing = Vec::new();
    let mut int_field = |name: &'static str, value: Option<i64>| {
        value.unwrap_or_else(|| {
            missing.push(name);
            0
        })
    };

    let ldr = int_field("ldr", payload.ldr);
    let potentiometer = int_field("pot", payload.pot);
    let fan_pwm = int_field("fan_pwm", payload.fan_pwm);

    let person_detected = match payload.pir.as_deref() {
        Some(PIR_DETECTED) => true,
        Some(PIR_NOT_DETECTED) => false,
        Some(other) => {
            tracing::debug!("unexpected pir value {:?}, treated as not detected", other);
            false
        }
        None => {
            missing.push("pir");
            false
        }
    };

    let light_on = match payload.light_state {
        Some(state) => state == 0,
        None => {
            missing.push("light_state");
            false
        }
    };

    if !missing.is_empty() {
        tracing::warn!("sensor payload missing {:?}, defaults applied", missing);
    }

    Reading {
        timestamp,
        ldr,
        person_detected,
        fan_pwm,
        light_on,
        potentiometer,
    }
}

/// Background loop that owns the current sensor state.
///
/// Each tick fetches the device once. A successful read is stored, cached and
/// published, in that order. A failed read is only logged, so subscribers keep
/// the last good reading. The interval is fixed and there is no backoff.
pub struct Poller {
    device: Arc<dyn Device>,
    store: Arc<dyn ReadingStore>,
    cache: Arc<StateCache>,
    fanout: Arc<Fanout>,
    interval: Duration,
    status: watch::Sender<PollerStatus>,
}

impl Poller {
    pub fn new(
        device: Arc<dyn Device>,
        store: Arc<dyn ReadingStore>,
        cache: Arc<StateCache>,
        fanout: Arc<Fanout>,
        interval: Duration,
    ) -> Self {
        let (status, _) = watch::channel(PollerStatus::default());

        Self {
            device,
            store,
            cache,
            fanout,
            interval,
            status,
        }
    }

    pub fn status(&self) -> watch::Receiver<PollerStatus> {
        self.status.subscribe()
    }

    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("poller started, interval {}ms", self.interval.as_millis());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await.ok();
                }
            }
        }

        self.status.send_modify(|status| status.state = PollerState::Stopped);
        tracing::info!("poller stopped");
    }

    pub async fn poll_once(&self) -> Result<Reading, DeviceError> {
        self.status.send_modify(|status| status.state = PollerState::Polling);

        let result = match self.device.fetch_reading().await {
            Ok(payload) => {
                let reading = normalize(&payload, self.next_timestamp().await);
                self.commit(&reading).await;
                Ok(reading)
            }
            Err(e) => {
                tracing::warn!("sensor poll failed: {}", e);
                Err(e)
            }
        };

        let now = OffsetDateTime::now_utc();
        self.status.send_modify(|status| {
            status.state = PollerState::Idle;
            match &result {
                Ok(_) => {
                    status.last_success = Some(now);
                    status.consecutive_failures = 0;
                }
                Err(e) => {
                    status.last_failure = Some(now);
                    status.last_error = Some(e.to_string());
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                }
            }
        });

        result
    }

    async fn commit(&self, reading: &Reading) {
        if let Err(e) = self.store.insert(reading).await {
            tracing::error!("failed to store reading: {:#}", e);
        }

        self.cache.replace(reading.clone()).await;

        let report = self.fanout.publish(reading).await;
        tracing::debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            pruned = report.pruned,
            "reading published"
        );
    }

    /// Capture time, never earlier than the cached reading.
    async fn next_timestamp(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        match self.cache.get().await {
            Some(previous) if previous.timestamp > now => previous.timestamp,
            _ => now,
        }
    }
}
