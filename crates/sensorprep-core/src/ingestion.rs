use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{PreprocessError, Result};
use crate::model::{Building, BuildingCollection, Sensor, SensorTable};

#[derive(Debug, Deserialize)]
struct BuildingRecord {
    name: String,
    sensors: Vec<Sensor>,
    dataframe: Value,
}

#[derive(Debug, Serialize)]
struct EncodedBuilding<'a> {
    name: &'a str,
    sensors: &'a [Sensor],
    dataframe: String,
}

/// Parses a raw request payload into buildings. Blank text is rejected as an empty payload.
pub fn parse_payload(text: &str) -> Result<BuildingCollection> {
    if text.trim().is_empty() {
        return Err(PreprocessError::EmptyPayload);
    }

    let payload: Value = serde_json::from_str(text)
        .map_err(|err| PreprocessError::malformed(format!("payload is not valid JSON: {err}")))?;
    json_to_buildings(&payload)
}

/// Converts a JSON object of building records into the in-memory collection.
///
/// The mapping key is the canonical building name. Each record's `dataframe` may be the
/// JSON-encoded string form or the same structure inlined as an object.
pub fn json_to_buildings(payload: &Value) -> Result<BuildingCollection> {
    let Value::Object(entries) = payload else {
        return Err(PreprocessError::malformed(
            "payload must be a JSON object mapping building names to building records",
        ));
    };

    let mut buildings = BuildingCollection::new();

    for (key, raw) in entries {
        let record = BuildingRecord::deserialize(raw)
            .map_err(|err| PreprocessError::malformed(format!("building '{key}': {err}")))?;

        if record.name != *key {
            warn!(
                building = %key,
                record_name = %record.name,
                "building record name differs from its key; using the key"
            );
        }

        let dataframe = parse_table_value(&record.dataframe).map_err(|err| match err {
            PreprocessError::MalformedInput(message) => {
                PreprocessError::malformed(format!("building '{key}': {message}"))
            }
            other => other,
        })?;

        debug!(
            building = %key,
            sensors = record.sensors.len(),
            columns = dataframe.width(),
            rows = dataframe.height(),
            "ingested building"
        );

        buildings.insert(key.clone(), Building::new(key.clone(), record.sensors, dataframe));
    }

    Ok(buildings)
}

/// Parses the JSON-encoded table form `{type: {"<epoch ms>": number | null}}`.
pub fn parse_table(encoded: &str) -> Result<SensorTable> {
    let parsed: Value = serde_json::from_str(encoded)
        .map_err(|err| PreprocessError::malformed(format!("dataframe is not valid JSON: {err}")))?;
    table_from_columns(&parsed)
}

fn parse_table_value(value: &Value) -> Result<SensorTable> {
    match value {
        Value::String(encoded) => parse_table(encoded),
        Value::Object(_) => table_from_columns(value),
        _ => Err(PreprocessError::malformed(
            "dataframe must be a JSON-encoded table or an object of columns",
        )),
    }
}

fn table_from_columns(value: &Value) -> Result<SensorTable> {
    let Value::Object(columns) = value else {
        return Err(PreprocessError::malformed(
            "dataframe must map sensor types to columns",
        ));
    };

    // Row index is the union of all column timestamps in order of first appearance.
    let mut timestamps: Vec<i64> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut parsed: Vec<(&str, Vec<(usize, Option<f64>)>)> = Vec::with_capacity(columns.len());

    for (name, column) in columns {
        let Value::Object(cells) = column else {
            return Err(PreprocessError::malformed(format!(
                "column '{name}' must map timestamps to values"
            )));
        };

        let mut entries = Vec::with_capacity(cells.len());
        for (key, cell) in cells {
            let timestamp = parse_timestamp(key)
                .map_err(|reason| PreprocessError::malformed(format!("column '{name}': {reason}")))?;
            let row = *positions.entry(timestamp).or_insert_with(|| {
                timestamps.push(timestamp);
                timestamps.len() - 1
            });
            let value = match cell {
                Value::Null => None,
                Value::Number(number) => Some(number.as_f64().ok_or_else(|| {
                    PreprocessError::malformed(format!(
                        "column '{name}' at {key}: {number} is not representable as f64"
                    ))
                })?),
                other => {
                    return Err(PreprocessError::malformed(format!(
                        "column '{name}' at {key}: expected a number or null, found {other}"
                    )))
                }
            };
            entries.push((row, value));
        }
        parsed.push((name.as_str(), entries));
    }

    let height = timestamps.len();
    let columns = parsed
        .into_iter()
        .map(|(name, entries)| {
            let mut values = vec![None; height];
            for (row, value) in entries {
                values[row] = value;
            }
            (name, values)
        })
        .collect::<Vec<_>>();

    Ok(SensorTable::from_values(timestamps, columns)?)
}

fn parse_timestamp(key: &str) -> std::result::Result<i64, String> {
    let millis: i64 = key
        .trim()
        .parse()
        .map_err(|_| format!("timestamp key '{key}' is not a millisecond epoch"))?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("timestamp {millis} is outside the representable range"))?;
    Ok(millis)
}

/// Encodes a table back into `{type: {"<epoch ms>": number | null}}`, one entry per row.
pub fn table_to_json(table: &SensorTable) -> Result<Value> {
    let mut columns = Map::with_capacity(table.width());
    for name in table.column_names() {
        let values = table.values(&name)?;
        let mut cells = Map::with_capacity(values.len());
        for (timestamp, value) in table.timestamps().iter().zip(values) {
            cells.insert(timestamp.to_string(), value.map_or(Value::Null, Value::from));
        }
        columns.insert(name, Value::Object(cells));
    }
    Ok(Value::Object(columns))
}

pub fn encode_table(table: &SensorTable) -> Result<String> {
    Ok(serde_json::to_string(&table_to_json(table)?)?)
}

/// Serializes the collection in the wire shape accepted by [`json_to_buildings`], with each
/// `dataframe` re-encoded as a JSON string.
pub fn buildings_to_json(data: &BuildingCollection) -> Result<Value> {
    let mut out = Map::with_capacity(data.len());
    for (key, building) in data {
        let record = EncodedBuilding {
            name: &building.name,
            sensors: &building.sensors,
            dataframe: encode_table(&building.dataframe)?,
        };
        out.insert(key.clone(), serde_json::to_value(record)?);
    }
    Ok(Value::Object(out))
}
