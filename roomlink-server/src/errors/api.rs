use super::{CommandError, DeviceError, ReadingError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Command error: {0}")]
    CommandError(#[from] CommandError),

    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),

    #[error("Reading error: {0}")]
    ReadingError(#[from] ReadingError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
