use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::info;

use crate::{
    column_filters::{remove_nan_dict, remove_unwanted_rows},
    config::{CleanConfig, InterpolateConfig, PreprocessConfig},
    duplicates::merge_duplicate_sensors,
    error::Result,
    ingestion::{buildings_to_json, json_to_buildings},
    interpolation::interpolate_dict_with,
    model::{column_count, sensor_count, BuildingCollection},
    reconcile::{remove_empty_buildings, remove_leftover_sensors},
};

pub trait PreprocessPipeline: Send + Sync {
    fn code_identifier(&self) -> &'static str;
    fn route(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self, data: BuildingCollection, config: &PreprocessConfig) -> Result<BuildingCollection>;
}

/// Duplicate merge, all-missing and sparse column removal, sensor reconciliation, then
/// removal of buildings left without sensors.
pub fn clean(data: BuildingCollection, config: &CleanConfig) -> Result<BuildingCollection> {
    let buildings_in = data.len();
    let sensors_in = sensor_count(&data);
    let columns_in = column_count(&data);

    let data = merge_duplicate_sensors(data, config.merge_threshold)?;
    let data = remove_nan_dict(data)?;
    let data = remove_unwanted_rows(data, config.min_valid_values)?;
    let data = remove_leftover_sensors(data)?;
    let data = remove_empty_buildings(data);

    info!(
        merge_threshold = config.merge_threshold,
        min_valid_values = config.min_valid_values,
        buildings_in,
        buildings_out = data.len(),
        sensors_in,
        sensors_out = sensor_count(&data),
        columns_in,
        columns_out = column_count(&data),
        "clean pipeline finished"
    );

    Ok(data)
}

/// Gap-fills every column. Buildings, sensors and columns are all kept.
pub fn interpolate(data: BuildingCollection, config: &InterpolateConfig) -> Result<BuildingCollection> {
    let buildings = data.len();
    let columns = column_count(&data);

    let data = interpolate_dict_with(data, config.method)?;

    info!(
        method = %config.method,
        buildings,
        columns,
        "interpolate pipeline finished"
    );

    Ok(data)
}

pub struct CleanPipeline;

impl PreprocessPipeline for CleanPipeline {
    fn code_identifier(&self) -> &'static str {
        "clean"
    }

    fn route(&self) -> &'static str {
        "/clean"
    }

    fn description(&self) -> &'static str {
        "Remove all unusable sensors and buildings from the supplied list of buildings"
    }

    fn run(&self, data: BuildingCollection, config: &PreprocessConfig) -> Result<BuildingCollection> {
        clean(data, &config.clean)
    }
}

pub struct InterpolatePipeline;

impl PreprocessPipeline for InterpolatePipeline {
    fn code_identifier(&self) -> &'static str {
        "interpolate"
    }

    fn route(&self) -> &'static str {
        "/interpolate"
    }

    fn description(&self) -> &'static str {
        "Interpolates all missing sensor values"
    }

    fn run(&self, data: BuildingCollection, config: &PreprocessConfig) -> Result<BuildingCollection> {
        interpolate(data, &config.interpolate)
    }
}

static PIPELINE_IMPLEMENTATIONS: Lazy<Vec<&'static dyn PreprocessPipeline>> = Lazy::new(|| {
    vec![
        &CleanPipeline as &dyn PreprocessPipeline,
        &InterpolatePipeline as &dyn PreprocessPipeline,
    ]
});

pub fn all_pipelines() -> &'static [&'static dyn PreprocessPipeline] {
    PIPELINE_IMPLEMENTATIONS.as_slice()
}

pub fn find_pipeline(code: &str) -> Option<&'static dyn PreprocessPipeline> {
    all_pipelines()
        .iter()
        .copied()
        .find(|pipeline| pipeline.code_identifier() == code)
}

/// Ingests a payload, runs `pipeline` over it and encodes the result in the same shape.
pub fn run_payload(
    pipeline: &dyn PreprocessPipeline,
    payload: &Value,
    config: &PreprocessConfig,
) -> Result<Value> {
    let buildings = json_to_buildings(payload)?;
    let processed = pipeline.run(buildings, config)?;
    buildings_to_json(&processed)
}

pub fn run_clean_payload(payload: &Value, config: &CleanConfig) -> Result<Value> {
    let config = PreprocessConfig {
        clean: *config,
        ..PreprocessConfig::default()
    };
    run_payload(&CleanPipeline, payload, &config)
}

pub fn run_interpolate_payload(payload: &Value, config: &InterpolateConfig) -> Result<Value> {
    let config = PreprocessConfig {
        interpolate: *config,
        ..PreprocessConfig::default()
    };
    run_payload(&InterpolatePipeline, payload, &config)
}
