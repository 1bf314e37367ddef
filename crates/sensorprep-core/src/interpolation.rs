use tracing::debug;

use crate::config::InterpolationMethod;
use crate::error::Result;
use crate::model::{BuildingCollection, SensorTable};

/// Fills missing values in one column.
///
/// Interior gaps lie on the segment between the neighbouring known values. Leading and
/// trailing gaps take the nearest known value, so a column with a single known value is
/// held constant and a column with none stays missing.
///
/// `Time` weights by timestamp distance and falls back to row distance wherever the index
/// around a gap is not ascending.
pub fn fill_column(
    timestamps: &[i64],
    values: &[Option<f64>],
    method: InterpolationMethod,
) -> Vec<Option<f64>> {
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(row, value)| value.map(|_| row))
        .collect();

    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return values.to_vec();
    };

    let mut filled = Vec::with_capacity(values.len());
    let mut upper = 0;

    for (row, value) in values.iter().enumerate() {
        if value.is_some() {
            filled.push(*value);
            continue;
        }

        if row < first {
            filled.push(values[first]);
            continue;
        }
        if row > last {
            filled.push(values[last]);
            continue;
        }

        while known[upper] < row {
            upper += 1;
        }
        let right = known[upper];
        let left = known[upper - 1];
        let fraction = segment_fraction(timestamps, left, row, right, method);

        filled.push(
            values[left]
                .zip(values[right])
                .map(|(start, end)| start + (end - start) * fraction),
        );
    }

    filled
}

fn segment_fraction(
    timestamps: &[i64],
    left: usize,
    row: usize,
    right: usize,
    method: InterpolationMethod,
) -> f64 {
    let positional = (row - left) as f64 / (right - left) as f64;
    match method {
        InterpolationMethod::Linear => positional,
        InterpolationMethod::Time => {
            let (start, at, end) = (timestamps[left], timestamps[row], timestamps[right]);
            if start < at && at < end {
                (at - start) as f64 / (end - start) as f64
            } else {
                positional
            }
        }
    }
}

pub fn interpolate_table(table: SensorTable, method: InterpolationMethod) -> Result<SensorTable> {
    Ok(table.map_columns(|timestamps, _, values| fill_column(timestamps, &values, method))?)
}

/// Linearly fills gaps in every column of every building.
pub fn interpolate_dict(data: BuildingCollection) -> Result<BuildingCollection> {
    interpolate_dict_with(data, InterpolationMethod::default())
}

pub fn interpolate_dict_with(
    data: BuildingCollection,
    method: InterpolationMethod,
) -> Result<BuildingCollection> {
    let mut out = BuildingCollection::new();
    for (key, mut building) in data {
        debug!(building = %key, %method, columns = building.dataframe.width(), "interpolating");
        building.dataframe = interpolate_table(building.dataframe, method)?;
        out.insert(key, building);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_interior_gap_on_segment() {
        let filled = fill_column(
            &[0, 1000, 2000],
            &[Some(1.0), None, Some(3.0)],
            InterpolationMethod::Linear,
        );
        assert_eq!(filled, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn boundaries_hold_nearest_value() {
        let filled = fill_column(
            &[0, 1, 2, 3, 4],
            &[None, Some(2.0), None, Some(4.0), None],
            InterpolationMethod::Linear,
        );
        assert_eq!(
            filled,
            vec![Some(2.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn degenerate_columns() {
        let empty = fill_column(&[0, 1], &[None, None], InterpolationMethod::Linear);
        assert_eq!(empty, vec![None, None]);

        let single = fill_column(&[0, 1, 2], &[None, Some(7.5), None], InterpolationMethod::Time);
        assert_eq!(single, vec![Some(7.5), Some(7.5), Some(7.5)]);
    }

    #[test]
    fn time_method_weights_by_timestamp() {
        let timestamps = [0, 1000, 4000];
        let values = [Some(0.0), None, Some(4.0)];

        let linear = fill_column(&timestamps, &values, InterpolationMethod::Linear);
        let time = fill_column(&timestamps, &values, InterpolationMethod::Time);

        assert_eq!(linear[1], Some(2.0));
        assert_eq!(time[1], Some(1.0));
    }

    #[test]
    fn time_method_falls_back_on_unsorted_index() {
        let filled = fill_column(
            &[0, 5000, 1000],
            &[Some(0.0), None, Some(2.0)],
            InterpolationMethod::Time,
        );
        assert_eq!(filled[1], Some(1.0));
    }
}
