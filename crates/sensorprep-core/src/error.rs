// crates/sensorprep-core/src/error.rs

use polars::error::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Payload can not be empty")]
    EmptyPayload,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data processing error: {0}")]
    Processing(String),
}

impl PreprocessError {
    pub fn malformed(message: impl Into<String>) -> Self {
        PreprocessError::MalformedInput(message.into())
    }

    /// True when the caller can fix the failure by resubmitting corrected input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PreprocessError::EmptyPayload | PreprocessError::MalformedInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PreprocessError>;
