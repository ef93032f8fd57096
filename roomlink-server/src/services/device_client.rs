use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use roomlink_api::AUTH_HEADER;
use roomlink_api::device::{LightStateBody, SensorPayload, SetFanBody, routes};

use crate::configs::Device as DeviceSettings;
use crate::errors::DeviceError;

/// A control command as the device understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    SetFan(u8),
    ToggleLight(bool),
    ToggleLdr,
    Pin6(bool),
}

impl DeviceCommand {
    pub fn path(&self) -> &'static str {
        match self {
            DeviceCommand::SetFan(_) => routes::SET_FAN,
            DeviceCommand::ToggleLight(_) => routes::TOGGLE_LIGHT,
            DeviceCommand::ToggleLdr => routes::TOGGLE_LDR,
            DeviceCommand::Pin6(true) => routes::TURN_ON_PIN6,
            DeviceCommand::Pin6(false) => routes::TURN_OFF_PIN6,
        }
    }

    /// Name used in logs and in command responses.
    pub fn name(&self) -> &'static str {
        self.path().trim_start_matches('/')
    }

    fn body(&self) -> Option<serde_json::Value> {
        match *self {
            DeviceCommand::SetFan(fan_speed) => serde_json::to_value(SetFanBody { fan_speed }).ok(),
            DeviceCommand::ToggleLight(state) => serde_json::to_value(LightStateBody { state }).ok(),
            DeviceCommand::ToggleLdr | DeviceCommand::Pin6(_) => None,
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::SetFan(speed) => write!(f, "{}({speed})", self.name()),
            DeviceCommand::ToggleLight(state) => write!(f, "{}({state})", self.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Acknowledgement of a relayed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}

/// The room controller as seen by the gateway.
#[async_trait]
pub trait Device: Send + Sync {
    async fn fetch_reading(&self) -> Result<SensorPayload, DeviceError>;

    async fn send_command(&self, command: DeviceCommand) -> Result<Ack, DeviceError>;
}

/// HTTP client for the room controller. Every request is bounded by the
/// configured timeout.
pub struct DeviceClient {
    http: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl DeviceClient {
    pub fn new(settings: &DeviceSettings) -> Result<Self, DeviceError> {
        let timeout = settings.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DeviceError::Rejected(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, error: reqwest::Error) -> DeviceError {
        if error.is_timeout() {
            DeviceError::Unreachable(format!("timed out after {}ms", self.timeout.as_millis()))
        } else {
            error.into()
        }
    }
}

#[async_trait]
impl Device for DeviceClient {
    async fn fetch_reading(&self) -> Result<SensorPayload, DeviceError> {
        let url = self.url(routes::SENSORS);
        tracing::trace!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Rejected(format!("GET {} returned HTTP {}", routes::SENSORS, status.as_u16())));
        }

        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;

        serde_json::from_slice::<SensorPayload>(&body)
            .map_err(|e| DeviceError::Rejected(format!("malformed sensor payload: {e}")))
    }

    async fn send_command(&self, command: DeviceCommand) -> Result<Ack, DeviceError> {
        let url = self.url(command.path());
        tracing::debug!("POST {} for {}", url, command);

        let mut request = self.http.post(&url).header(AUTH_HEADER, &self.token);
        if let Some(body) = command.body() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Rejected(format!("{} returned HTTP {}", command.name(), status.as_u16())));
        }

        Ok(Ack { status: status.as_u16() })
    }
}
