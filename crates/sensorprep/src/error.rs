use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sensorprep_core::PreprocessError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Response body for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Input problems become 400 with their description; anything else becomes an opaque 500.
#[derive(Debug)]
pub struct ApiError(pub PreprocessError);

impl From<PreprocessError> for ApiError {
    fn from(err: PreprocessError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.0.is_input_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!("pipeline failed: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
