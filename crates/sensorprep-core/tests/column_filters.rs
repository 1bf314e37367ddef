use anyhow::Result;
use sensorprep_core::{
    column_filters::{drop_sparse_columns, remove_nan_dict, remove_unwanted_rows},
    Building, BuildingCollection, Sensor, SensorTable,
};

fn building(table: SensorTable) -> BuildingCollection {
    let sensors = table
        .column_names()
        .into_iter()
        .map(|name| Sensor::new(name, "d", "C"))
        .collect();
    BuildingCollection::from([("B1".to_string(), Building::new("B1", sensors, table))])
}

#[test]
fn remove_nan_drops_only_all_missing_columns() -> Result<()> {
    let table = SensorTable::from_values(
        vec![0, 1000, 2000],
        vec![
            ("full", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ("empty", vec![None, None, None]),
            ("sparse", vec![None, Some(5.0), None]),
        ],
    )?;

    let data = remove_nan_dict(building(table))?;
    let b1 = &data["B1"];

    assert_eq!(b1.dataframe.column_names(), vec!["full", "sparse"]);
    // Sensor lists are reconciled later.
    assert_eq!(b1.sensors.len(), 3);
    assert_eq!(b1.dataframe.height(), 3);
    Ok(())
}

#[test]
fn threshold_is_an_inclusive_minimum() -> Result<()> {
    let table = SensorTable::from_values(
        vec![0, 1, 2, 3],
        vec![
            ("three", vec![Some(1.0), Some(1.0), None, Some(1.0)]),
            ("two", vec![Some(1.0), None, None, Some(2.0)]),
            ("four", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        ],
    )?;

    let data = remove_unwanted_rows(building(table), 3)?;
    assert_eq!(data["B1"].dataframe.column_names(), vec!["three", "four"]);
    Ok(())
}

#[test]
fn zero_threshold_keeps_everything() -> Result<()> {
    let table = SensorTable::from_values(vec![0, 1], vec![("empty", vec![None, None])])?;
    let table = drop_sparse_columns(table, 0)?;
    assert_eq!(table.column_names(), vec!["empty"]);
    Ok(())
}

#[test]
fn counts_values_not_distinct_values() -> Result<()> {
    let table = SensorTable::from_values(
        vec![0, 1, 2],
        vec![("flat", vec![Some(2.0), Some(2.0), Some(2.0)])],
    )?;
    let table = drop_sparse_columns(table, 3)?;
    assert_eq!(table.width(), 1);
    Ok(())
}
