use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BuildingCollection, SensorTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    MinMax,
    Mean,
}

/// Rescales present values to `[0, 1]`. A constant column has no range and becomes missing.
pub fn min_max_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;

    values
        .iter()
        .map(|value| {
            value.and_then(|v| {
                let scaled = (v - min) / range;
                scaled.is_finite().then_some(scaled)
            })
        })
        .collect()
}

/// Standardizes present values with the sample standard deviation (n - 1).
pub fn mean_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return vec![None; values.len()];
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    values
        .iter()
        .map(|value| {
            value.and_then(|v| {
                let z = (v - mean) / std;
                z.is_finite().then_some(z)
            })
        })
        .collect()
}

pub fn min_max_normalization(table: SensorTable) -> Result<SensorTable> {
    Ok(table.map_columns(|_, _, values| min_max_column(&values))?)
}

pub fn mean_normalization(table: SensorTable) -> Result<SensorTable> {
    Ok(table.map_columns(|_, _, values| mean_column(&values))?)
}

pub fn normalize_dict(
    data: BuildingCollection,
    method: NormalizationMethod,
) -> Result<BuildingCollection> {
    let mut out = BuildingCollection::new();
    for (key, mut building) in data {
        building.dataframe = match method {
            NormalizationMethod::MinMax => min_max_normalization(building.dataframe)?,
            NormalizationMethod::Mean => mean_normalization(building.dataframe)?,
        };
        out.insert(key, building);
    }
    Ok(out)
}
