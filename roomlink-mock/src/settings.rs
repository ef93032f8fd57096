use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    pub host: String,
    pub port: u16,
    /// Must match `device.token` of the gateway
    pub token: String,
    /// Chance per read that the motion sensor reports a person
    pub presence_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub mock: Mock,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))?;

        if !(0.0..=1.0).contains(&settings.mock.presence_probability) {
            return Err("mock.presence_probability must be within 0.0 and 1.0".into());
        }

        Ok(settings)
    }
}
