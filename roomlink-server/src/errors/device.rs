use axum::http::StatusCode;

/// Failure talking to the room controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Timeout or connection failure
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// Non-2xx status or a body that could not be parsed
    #[error("Device rejected the request: {0}")]
    Rejected(String),
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DeviceError::Rejected(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            DeviceError::Unreachable(reason) | DeviceError::Rejected(reason) => reason,
        }
    }
}

impl From<reqwest::Error> for DeviceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() {
            DeviceError::Unreachable(error.to_string())
        } else {
            DeviceError::Rejected(error.to_string())
        }
    }
}
