use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::model::{BuildingCollection, SensorTable};

/// Decides whether two present-value sequences are duplicates under `threshold`.
///
/// Sequences of different length never match. Equal sequences always match for any
/// threshold. Otherwise they match when fewer than `threshold` positions differ, which can
/// never hold for `threshold <= 0`.
pub fn is_near_duplicate(left: &[f64], right: &[f64], threshold: i64) -> bool {
    if left.len() != right.len() {
        return false;
    }
    if left == right {
        return true;
    }

    let mismatches = left
        .iter()
        .zip(right)
        .filter(|(a, b)| a != b)
        .count();
    (mismatches as i64) < threshold
}

/// Returns the names of columns that duplicate an earlier column.
///
/// Every pair `(i, j)` with `i < j` is compared on non-missing values only; column `j` is
/// marked when it matches column `i`. Marked columns still act as comparison sources for
/// later pairs. Runs in O(c² · r) for `c` columns of `r` rows.
pub fn find_duplicate_columns(table: &SensorTable, threshold: i64) -> Result<Vec<String>> {
    let names = table.column_names();
    let mut present = Vec::with_capacity(names.len());
    for name in &names {
        present.push(table.present_values(name)?);
    }

    let mut marked: Vec<String> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            if seen.contains(&j) {
                continue;
            }
            if is_near_duplicate(&present[i], &present[j], threshold) {
                seen.insert(j);
                marked.push(names[j].clone());
            }
        }
    }

    Ok(marked)
}

/// Drops near-duplicate columns from one table, applying all deletions after comparison.
pub fn drop_duplicate_columns(table: SensorTable, threshold: i64) -> Result<SensorTable> {
    let marked: HashSet<String> = find_duplicate_columns(&table, threshold)?
        .into_iter()
        .collect();
    Ok(table.without_columns(&marked)?)
}

pub fn merge_duplicate_sensors(data: BuildingCollection, threshold: i64) -> Result<BuildingCollection> {
    let mut out = BuildingCollection::new();
    for (key, mut building) in data {
        let marked = find_duplicate_columns(&building.dataframe, threshold)?;
        if !marked.is_empty() {
            debug!(building = %key, threshold, columns = ?marked, "merging duplicate sensors");
            let marked: HashSet<String> = marked.into_iter().collect();
            building.dataframe = building.dataframe.without_columns(&marked)?;
        }
        out.insert(key, building);
    }
    Ok(out)
}
