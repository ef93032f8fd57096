use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    #[error("No data yet")]
    NoDataYet,

    #[error("Invalid history limit {0}, expected 1 to {1}")]
    InvalidLimit(u32, u32),
}

impl ReadingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReadingError::NoDataYet => StatusCode::SERVICE_UNAVAILABLE,
            ReadingError::InvalidLimit(..) => StatusCode::BAD_REQUEST,
        }
    }
}
