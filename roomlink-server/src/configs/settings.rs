use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Base address of the room controller, e.g. `http://192.168.43.147`
    pub base_url: String,
    /// Shared secret sent to the device and required on controlled routes
    pub token: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Device {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fanout {
    /// Readings buffered per subscriber before new ones are dropped
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub device: Device,
    pub database: Database,
    pub fanout: Fanout,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("ROOMLINK").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.poll_interval_ms == 0 {
            return Err(ConfigError::Message("device.poll_interval_ms must be positive".into()));
        }
        if self.device.request_timeout_ms == 0 {
            return Err(ConfigError::Message("device.request_timeout_ms must be positive".into()));
        }
        if self.fanout.capacity == 0 {
            return Err(ConfigError::Message("fanout.capacity must be positive".into()));
        }
        if !self.device.base_url.starts_with("http://") && !self.device.base_url.starts_with("https://") {
            return Err(ConfigError::Message(format!(
                "device.base_url must be an http(s) address, got {}",
                self.device.base_url
            )));
        }

        Ok(())
    }
}
