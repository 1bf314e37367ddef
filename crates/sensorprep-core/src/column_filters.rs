use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::model::{BuildingCollection, SensorTable};

/// Drops every column whose entries are all missing.
pub fn drop_empty_columns(table: SensorTable) -> Result<SensorTable> {
    drop_sparse_columns(table, 1)
}

/// Drops every column holding fewer than `threshold` non-missing values. A column with
/// exactly `threshold` values survives, so a threshold of 0 keeps everything.
pub fn drop_sparse_columns(table: SensorTable, threshold: usize) -> Result<SensorTable> {
    let mut dropped = HashSet::new();
    for name in table.column_names() {
        if table.valid_count(&name)? < threshold {
            dropped.insert(name);
        }
    }
    Ok(table.without_columns(&dropped)?)
}

/// Removes all-missing columns from every building. Sensor lists are left untouched.
pub fn remove_nan_dict(data: BuildingCollection) -> Result<BuildingCollection> {
    let mut out = BuildingCollection::new();
    for (key, mut building) in data {
        let before = building.dataframe.width();
        building.dataframe = drop_empty_columns(building.dataframe)?;
        debug!(
            building = %key,
            dropped = before - building.dataframe.width(),
            "removed all-missing columns"
        );
        out.insert(key, building);
    }
    Ok(out)
}

/// Removes columns with fewer than `threshold` non-missing values from every building.
pub fn remove_unwanted_rows(data: BuildingCollection, threshold: usize) -> Result<BuildingCollection> {
    let mut out = BuildingCollection::new();
    for (key, mut building) in data {
        let before = building.dataframe.width();
        building.dataframe = drop_sparse_columns(building.dataframe, threshold)?;
        debug!(
            building = %key,
            threshold,
            dropped = before - building.dataframe.width(),
            "removed sparse columns"
        );
        out.insert(key, building);
    }
    Ok(out)
}
