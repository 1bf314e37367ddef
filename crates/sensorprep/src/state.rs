use sensorprep_core::PreprocessConfig;

/// Server-wide defaults. Every request copies these and builds its own collection.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub config: PreprocessConfig,
}

impl AppState {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }
}
