use std::sync::Arc;

use crate::errors::CommandError;
use crate::services::{Ack, Device, DeviceCommand};

pub const FAN_SPEED_MAX: i64 = 255;

/// The only `/control/light` state that switches the light on.
pub const LIGHT_ON: &str = "on";

/// Validates, authorizes and forwards control commands to the device.
///
/// The legacy entry points (`set_fan`, `toggle_light`) take no token; the
/// controlled ones (`control_fan`, `control_light`) require the shared
/// secret. Every call makes at most one device request and never retries.
pub struct CommandRelay {
    device: Arc<dyn Device>,
    secret: String,
}

impl CommandRelay {
    pub fn new(device: Arc<dyn Device>, secret: impl Into<String>) -> Self {
        Self {
            device,
            secret: secret.into(),
        }
    }

    /// Compares a token against the shared secret. No device call.
    pub fn authenticate(&self, token: Option<&str>) -> Result<(), CommandError> {
        match token {
            Some(token) if !self.secret.is_empty() && token == self.secret => Ok(()),
            _ => Err(CommandError::Unauthorized),
        }
    }

    pub async fn set_fan(&self, speed: i64) -> Result<Ack, CommandError> {
        let speed = validate_fan_speed(speed)?;

        self.forward(DeviceCommand::SetFan(speed)).await
    }

    pub async fn control_fan(&self, token: Option<&str>, speed: i64) -> Result<Ack, CommandError> {
        self.authenticate(token)?;

        self.set_fan(speed).await
    }

    pub async fn toggle_light(&self, state: bool) -> Result<Ack, CommandError> {
        self.forward(DeviceCommand::ToggleLight(state)).await
    }

    /// `"on"` switches the light on; any other value switches it off.
    pub async fn control_light(&self, token: Option<&str>, state: &str) -> Result<Ack, CommandError> {
        self.authenticate(token)?;

        self.toggle_light(state == LIGHT_ON).await
    }

    pub async fn toggle_ldr(&self) -> Result<Ack, CommandError> {
        self.forward(DeviceCommand::ToggleLdr).await
    }

    pub async fn set_pin6(&self, on: bool) -> Result<Ack, CommandError> {
        self.forward(DeviceCommand::Pin6(on)).await
    }

    async fn forward(&self, command: DeviceCommand) -> Result<Ack, CommandError> {
        match self.device.send_command(command).await {
            Ok(ack) => {
                tracing::info!("relayed {} (HTTP {})", command, ack.status);
                Ok(ack)
            }
            Err(e) => {
                tracing::warn!("relaying {} failed: {}", command, e);
                Err(e.into())
            }
        }
    }
}

fn validate_fan_speed(speed: i64) -> Result<u8, CommandError> {
    u8::try_from(speed)
        .map_err(|_| CommandError::InvalidArgument(format!("fan speed {speed} is outside 0..={FAN_SPEED_MAX}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use roomlink_api::device::SensorPayload;

    use super::*;
    use crate::errors::DeviceError;

    /// Device double recording every command it receives.
    #[derive(Default)]
    pub(crate) struct RecordingDevice {
        pub commands: Mutex<Vec<DeviceCommand>>,
        pub failure: Option<DeviceError>,
    }

    impl RecordingDevice {
        pub fn failing(failure: DeviceError) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                failure: Some(failure),
            }
        }

        pub fn sent(&self) -> Vec<DeviceCommand> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Device for RecordingDevice {
        async fn fetch_reading(&self) -> Result<SensorPayload, DeviceError> {
            Ok(SensorPayload::default())
        }

        async fn send_command(&self, command: DeviceCommand) -> Result<Ack, DeviceError> {
            self.commands.lock().unwrap().push(command);
            match &self.failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(Ack { status: 200 }),
            }
        }
    }

    fn relay() -> (Arc<RecordingDevice>, CommandRelay) {
        let device = Arc::new(RecordingDevice::default());
        let relay = CommandRelay::new(device.clone(), "1234567");
        (device, relay)
    }

    #[tokio::test]
    async fn test_fan_speed_bounds() {
        let (device, relay) = relay();

        assert!(relay.set_fan(0).await.is_ok());
        assert!(relay.set_fan(255).await.is_ok());

        for speed in [-1, 256, 300] {
            assert!(matches!(
                relay.set_fan(speed).await,
                Err(CommandError::InvalidArgument(_))
            ));
        }

        assert_eq!(
            device.sent(),
            vec![DeviceCommand::SetFan(0), DeviceCommand::SetFan(255)]
        );
    }

    #[tokio::test]
    async fn test_controlled_routes_need_the_secret() {
        let (device, relay) = relay();

        for token in [None, Some(""), Some("wrong"), Some("12345678")] {
            assert_eq!(
                relay.control_fan(token, 100).await,
                Err(CommandError::Unauthorized)
            );
            assert_eq!(
                relay.control_light(token, "on").await,
                Err(CommandError::Unauthorized)
            );
        }
        assert!(device.sent().is_empty());

        relay.control_fan(Some("1234567"), 100).await.unwrap();
        relay.control_light(Some("1234567"), "on").await.unwrap();
        relay.control_light(Some("1234567"), "off").await.unwrap();
        relay.control_light(Some("1234567"), "ON").await.unwrap();

        assert_eq!(
            device.sent(),
            vec![
                DeviceCommand::SetFan(100),
                DeviceCommand::ToggleLight(true),
                DeviceCommand::ToggleLight(false),
                DeviceCommand::ToggleLight(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_authorization_checked_before_validation() {
        let (device, relay) = relay();

        assert_eq!(
            relay.control_fan(Some("wrong"), 999).await,
            Err(CommandError::Unauthorized)
        );
        assert!(matches!(
            relay.control_fan(Some("1234567"), 999).await,
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(device.sent().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_routes_need_no_token() {
        let (device, relay) = relay();

        relay.toggle_light(true).await.unwrap();
        relay.toggle_ldr().await.unwrap();
        relay.set_pin6(true).await.unwrap();
        relay.set_pin6(false).await.unwrap();

        assert_eq!(
            device.sent(),
            vec![
                DeviceCommand::ToggleLight(true),
                DeviceCommand::ToggleLdr,
                DeviceCommand::Pin6(true),
                DeviceCommand::Pin6(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_device_failure_is_reported_once() {
        let device = Arc::new(RecordingDevice::failing(DeviceError::Unreachable(
            "timed out".to_string(),
        )));
        let relay = CommandRelay::new(device.clone(), "1234567");

        assert_eq!(
            relay.toggle_ldr().await,
            Err(CommandError::Device(DeviceError::Unreachable(
                "timed out".to_string()
            )))
        );
        assert_eq!(device.sent().len(), 1);
    }

    #[test]
    fn test_authenticate() {
        let (_, relay) = relay();

        assert!(relay.authenticate(Some("1234567")).is_ok());
        assert!(relay.authenticate(Some("7654321")).is_err());
        assert!(relay.authenticate(None).is_err());
    }

    #[test]
    fn test_empty_secret_rejects_everything() {
        let relay = CommandRelay::new(Arc::new(RecordingDevice::default()), "");

        assert!(relay.authenticate(Some("")).is_err());
    }
}
