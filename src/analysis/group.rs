use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalField, NumericField};

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

/// Row order of a grouped result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Alphabetical by group key.
    #[default]
    ByKey,
    /// By the first requested field, smallest first.
    Ascending,
    /// By the first requested field, largest first.
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub count: usize,
    /// One mean per requested field, same order as [`GroupedMeans::fields`].
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedMeans {
    pub by: CategoricalField,
    pub fields: Vec<NumericField>,
    pub rows: Vec<GroupRow>,
}

impl GroupedMeans {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, field: NumericField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// `(key, mean)` pairs for one field, in row order.
    pub fn series(&self, field: NumericField) -> Vec<(&str, f64)> {
        match self.column(field) {
            Some(col) => self
                .rows
                .iter()
                .map(|row| (row.key.as_str(), row.values[col]))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Group with the largest mean of `field`; the first one wins ties.
    pub fn max_by(&self, field: NumericField) -> Option<(&str, f64)> {
        self.series(field)
            .into_iter()
            .fold(None, |best, (key, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((key, value)),
            })
    }
}

/// Mean of each `fields` entry per distinct value of `by`.
///
/// Records without a value for `by` (a missing Gender) are skipped.
pub fn group_means(
    view: &FilteredView<'_>,
    by: CategoricalField,
    fields: &[NumericField],
    order: SortOrder,
) -> GroupedMeans {
    let mut groups: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
    for record in view.records() {
        let Some(key) = record.category(by) else {
            continue;
        };
        let (count, sums) = groups
            .entry(key)
            .or_insert_with(|| (0, vec![0.0; fields.len()]));
        *count += 1;
        for (sum, field) in sums.iter_mut().zip(fields) {
            *sum += record.numeric(*field);
        }
    }

    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(key, (count, sums))| GroupRow {
            key: key.to_string(),
            count,
            values: sums.into_iter().map(|s| s / count as f64).collect(),
        })
        .collect();

    if !fields.is_empty() {
        match order {
            SortOrder::ByKey => {}
            SortOrder::Ascending => rows.sort_by(|a, b| a.values[0].total_cmp(&b.values[0])),
            SortOrder::Descending => rows.sort_by(|a, b| b.values[0].total_cmp(&a.values[0])),
        }
    }

    GroupedMeans {
        by,
        fields: fields.to_vec(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

/// Frequency of each value of `field`, most frequent first.  Ties keep the
/// order in which values first appear in the view.
pub fn value_counts(view: &FilteredView<'_>, field: CategoricalField) -> Vec<(String, usize)> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in view.records().filter_map(|r| r.category(field)) {
        match position.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Cross-tabulation
// ---------------------------------------------------------------------------

/// Row-normalised distribution of `cols` within each value of `rows`, in
/// percent.  Only non-empty row groups appear, so every row sums to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub rows_field: CategoricalField,
    pub cols_field: CategoricalField,
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    /// `percentages[row][col]`.
    pub percentages: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }
}

pub fn cross_tab(
    view: &FilteredView<'_>,
    rows: CategoricalField,
    cols: CategoricalField,
) -> CrossTab {
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    let mut col_keys: Vec<&str> = Vec::new();
    for record in view.records() {
        let (Some(row), Some(col)) = (record.category(rows), record.category(cols)) else {
            continue;
        };
        *counts.entry(row).or_default().entry(col).or_default() += 1;
        if !col_keys.contains(&col) {
            col_keys.push(col);
        }
    }
    col_keys.sort_unstable();

    let percentages = counts
        .values()
        .map(|row| {
            let total: usize = row.values().sum();
            col_keys
                .iter()
                .map(|col| {
                    let n = row.get(col).copied().unwrap_or(0);
                    n as f64 / total as f64 * 100.0
                })
                .collect()
        })
        .collect();

    CrossTab {
        rows_field: rows,
        cols_field: cols,
        row_keys: counts.keys().map(|k| k.to_string()).collect(),
        col_keys: col_keys.into_iter().map(str::to_string).collect(),
        percentages,
    }
}
