use anyhow::Result;
use sensorprep_core::{
    reconcile::{remove_empty_buildings, remove_leftover_sensors},
    Building, BuildingCollection, Sensor, SensorTable,
};

#[test]
fn sensors_without_columns_are_removed() -> Result<()> {
    let table = SensorTable::from_values(vec![0], vec![("kept", vec![Some(1.0)])])?;
    let sensors = vec![Sensor::new("kept", "d", "kW"), Sensor::new("gone", "d", "kW")];
    let data = BuildingCollection::from([("B1".to_string(), Building::new("B1", sensors, table))]);

    let data = remove_leftover_sensors(data)?;
    assert_eq!(data["B1"].sensors, vec![Sensor::new("kept", "d", "kW")]);
    Ok(())
}

#[test]
fn columns_without_sensors_are_removed() -> Result<()> {
    let table = SensorTable::from_values(
        vec![0],
        vec![("listed", vec![Some(1.0)]), ("unlisted", vec![Some(2.0)])],
    )?;
    let data = BuildingCollection::from([(
        "B1".to_string(),
        Building::new("B1", vec![Sensor::new("listed", "d", "C")], table),
    )]);

    let data = remove_leftover_sensors(data)?;
    assert_eq!(data["B1"].dataframe.column_names(), vec!["listed"]);
    Ok(())
}

#[test]
fn empty_buildings_are_filtered() -> Result<()> {
    let with_sensor = Building::new(
        "full",
        vec![Sensor::new("T", "d", "C")],
        SensorTable::from_values(vec![0], vec![("T", vec![Some(1.0)])])?,
    );
    let without = Building::new("empty", Vec::new(), SensorTable::default());
    let data = BuildingCollection::from([
        ("full".to_string(), with_sensor),
        ("empty".to_string(), without),
    ]);

    let data = remove_empty_buildings(data);
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["full"]);
    Ok(())
}
