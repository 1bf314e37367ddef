use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::model::{Building, BuildingCollection};

/// Aligns sensors and columns: sensors without a surviving column are dropped, then columns
/// that no remaining sensor names are dropped. Must run after every column-dropping pass.
pub fn reconcile_building(mut building: Building) -> Result<Building> {
    let before = building.sensors.len();
    building
        .sensors
        .retain(|sensor| building.dataframe.contains_column(&sensor.sensor_type));

    let named: HashSet<&str> = building
        .sensors
        .iter()
        .map(|sensor| sensor.sensor_type.as_str())
        .collect();
    let orphaned: HashSet<String> = building
        .dataframe
        .column_names()
        .into_iter()
        .filter(|name| !named.contains(name.as_str()))
        .collect();

    debug!(
        building = %building.name,
        sensors_removed = before - building.sensors.len(),
        orphaned_columns = ?orphaned,
        "reconciled sensor list"
    );

    building.dataframe = building.dataframe.without_columns(&orphaned)?;
    Ok(building)
}

pub fn remove_leftover_sensors(data: BuildingCollection) -> Result<BuildingCollection> {
    data.into_iter()
        .map(|(key, building)| Ok((key, reconcile_building(building)?)))
        .collect()
}

/// Keeps only buildings that still list at least one sensor.
pub fn remove_empty_buildings(data: BuildingCollection) -> BuildingCollection {
    data.into_iter()
        .filter(|(key, building)| {
            let keep = !building.sensors.is_empty();
            if !keep {
                debug!(building = %key, "dropping building without sensors");
            }
            keep
        })
        .collect()
}
