use axum::http::StatusCode;

use super::DeviceError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl CommandError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommandError::Unauthorized => StatusCode::UNAUTHORIZED,
            CommandError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CommandError::Device(e) => e.status_code(),
        }
    }
}
