pub mod column_filters;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod ingestion;
pub mod interpolation;
pub mod model;
pub mod normalization;
pub mod pipelines;
pub mod reconcile;

pub use config::{CleanConfig, ConfigError, InterpolateConfig, InterpolationMethod, PreprocessConfig};
pub use error::{PreprocessError, Result};
pub use model::{Building, BuildingCollection, Sensor, SensorTable};
