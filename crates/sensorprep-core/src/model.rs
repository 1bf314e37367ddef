use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for one measurement feed. `sensor_type` doubles as the column key in the
/// owning building's table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub desc: String,
    pub unit: String,
}

impl Sensor {
    pub fn new(
        sensor_type: impl Into<String>,
        desc: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            desc: desc.into(),
            unit: unit.into(),
        }
    }
}

/// Time-indexed sensor columns for a single building.
///
/// Values live in a polars `DataFrame` of `Float64` columns where null marks a missing
/// reading. The millisecond-epoch row index is held next to the frame rather than inside it,
/// so no sensor type can shadow it.
#[derive(Debug, Clone, Default)]
pub struct SensorTable {
    timestamps: Vec<i64>,
    frame: DataFrame,
}

impl SensorTable {
    pub fn new(timestamps: Vec<i64>, columns: Vec<Column>) -> PolarsResult<Self> {
        for column in &columns {
            if column.len() != timestamps.len() {
                return Err(PolarsError::ShapeMismatch(
                    format!(
                        "column '{}' has {} rows but the index has {}",
                        column.name(),
                        column.len(),
                        timestamps.len()
                    )
                    .into(),
                ));
            }
        }

        let frame = DataFrame::new(columns)?;
        Ok(Self { timestamps, frame })
    }

    /// Builds a table from plain value vectors, one `(sensor type, values)` pair per column.
    pub fn from_values<S: AsRef<str>>(
        timestamps: Vec<i64>,
        columns: Vec<(S, Vec<Option<f64>>)>,
    ) -> PolarsResult<Self> {
        let columns = columns
            .into_iter()
            .map(|(name, values)| Series::new(name.as_ref().into(), values).into())
            .collect::<Vec<Column>>();
        Self::new(timestamps, columns)
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.timestamps.len()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.frame
            .get_columns()
            .iter()
            .any(|column| column.name().as_str() == name)
    }

    pub fn values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        Ok(self.frame.column(name)?.f64()?.into_iter().collect())
    }

    /// Non-missing values of a column in row order.
    pub fn present_values(&self, name: &str) -> PolarsResult<Vec<f64>> {
        Ok(self.frame.column(name)?.f64()?.into_iter().flatten().collect())
    }

    pub fn valid_count(&self, name: &str) -> PolarsResult<usize> {
        let column = self.frame.column(name)?;
        Ok(column.len() - column.null_count())
    }

    /// Returns the table without the named columns. Unknown names are ignored.
    pub fn without_columns(self, dropped: &HashSet<String>) -> PolarsResult<Self> {
        if dropped.is_empty() {
            return Ok(self);
        }

        let kept = self
            .frame
            .get_columns()
            .iter()
            .filter(|column| !dropped.contains(column.name().as_str()))
            .cloned()
            .collect::<Vec<Column>>();
        Self::new(self.timestamps, kept)
    }

    /// Rebuilds every column through `transform`, which receives the row index, the column
    /// name and the current values.
    pub fn map_columns<F>(self, mut transform: F) -> PolarsResult<Self>
    where
        F: FnMut(&[i64], &str, Vec<Option<f64>>) -> Vec<Option<f64>>,
    {
        let mut columns = Vec::with_capacity(self.width());
        for name in self.column_names() {
            let values = self.values(&name)?;
            let updated = transform(&self.timestamps, &name, values);
            columns.push(Series::new(name.as_str().into(), updated).into());
        }
        Self::new(self.timestamps, columns)
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    pub name: String,
    pub sensors: Vec<Sensor>,
    pub dataframe: SensorTable,
}

impl Building {
    pub fn new(name: impl Into<String>, sensors: Vec<Sensor>, dataframe: SensorTable) -> Self {
        Self {
            name: name.into(),
            sensors,
            dataframe,
        }
    }
}

/// Buildings keyed by name.
pub type BuildingCollection = BTreeMap<String, Building>;

pub fn sensor_count(data: &BuildingCollection) -> usize {
    data.values().map(|building| building.sensors.len()).sum()
}

pub fn column_count(data: &BuildingCollection) -> usize {
    data.values().map(|building| building.dataframe.width()).sum()
}
