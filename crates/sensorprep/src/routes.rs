use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use sensorprep_core::{
    pipelines::{all_pipelines, run_payload, CleanPipeline, InterpolatePipeline, PreprocessPipeline},
    InterpolationMethod, PreprocessConfig, PreprocessError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PreprocessRequest {
    /// Building collection, either inline or as a JSON string.
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanParams {
    pub merge_threshold: Option<i64>,
    pub min_valid_values: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InterpolateParams {
    pub method: Option<InterpolationMethod>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteInfo {
    pub path: String,
    pub name: String,
}

pub async fn root() -> Json<Vec<RouteInfo>> {
    let mut routes = vec![RouteInfo {
        path: "/".to_string(),
        name: "Root path".to_string(),
    }];
    routes.extend(all_pipelines().iter().map(|pipeline| RouteInfo {
        path: pipeline.route().to_string(),
        name: pipeline.description().to_string(),
    }));
    Json(routes)
}

pub async fn clean(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<CleanParams>,
    Json(request): Json<PreprocessRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut config = app_state.config;
    if let Some(threshold) = params.merge_threshold {
        config.clean.merge_threshold = threshold;
    }
    if let Some(min_valid_values) = params.min_valid_values {
        config.clean.min_valid_values = min_valid_values;
    }

    run_pipeline(&CleanPipeline, request.payload, config)
        .await
        .map(Json)
}

pub async fn interpolate(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<InterpolateParams>,
    Json(request): Json<PreprocessRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut config = app_state.config;
    if let Some(method) = params.method {
        config.interpolate.method = method;
    }

    run_pipeline(&InterpolatePipeline, request.payload, config)
        .await
        .map(Json)
}

async fn run_pipeline(
    pipeline: &'static dyn PreprocessPipeline,
    payload: Option<Value>,
    config: PreprocessConfig,
) -> Result<Value, ApiError> {
    let payload = resolve_payload(payload)?;
    let payload_hash = blake3::hash(payload.to_string().as_bytes()).to_hex().to_string();
    info!(
        pipeline = pipeline.code_identifier(),
        payload_hash = %payload_hash,
        "processing request"
    );

    tokio::task::spawn_blocking(move || run_payload(pipeline, &payload, &config))
        .await
        .map_err(|err| PreprocessError::Processing(format!("worker task failed: {err}")))?
        .map_err(ApiError::from)
}

/// Accepts the collection inline or as JSON text; absent, null and blank payloads are empty.
fn resolve_payload(payload: Option<Value>) -> Result<Value, PreprocessError> {
    match payload {
        None | Some(Value::Null) => Err(PreprocessError::EmptyPayload),
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Err(PreprocessError::EmptyPayload);
            }
            serde_json::from_str(&text).map_err(|err| {
                PreprocessError::malformed(format!("payload is not valid JSON: {err}"))
            })
        }
        Some(other) => Ok(other),
    }
}
