use serde::Serialize;

use super::stats::{is_constant, pearson};
use crate::data::filter::FilteredView;
use crate::data::model::NumericField;

/// Pairwise Pearson coefficients; `None` where the coefficient is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    /// `values[i][j]` correlates `fields[i]` with `fields[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Matrix over all eight numeric fields.
    pub fn compute(view: &FilteredView<'_>) -> Self {
        Self::for_fields(view, &NumericField::ALL)
    }

    pub fn for_fields(view: &FilteredView<'_>, fields: &[NumericField]) -> Self {
        let columns: Vec<Vec<f64>> = fields
            .iter()
            .map(|&field| view.records().map(|r| r.numeric(field)).collect())
            .collect();

        let n = fields.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            values[i][i] = (columns[i].len() >= 2 && !is_constant(&columns[i])).then_some(1.0);
            for j in (i + 1)..n {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            fields: fields.to_vec(),
            values,
        }
    }

    fn index(&self, field: NumericField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    pub fn get(&self, a: NumericField, b: NumericField) -> Option<f64> {
        self.values[self.index(a)?][self.index(b)?]
    }

    /// Correlations of every other field with `target`, strongest first.
    /// Sorted by magnitude; the reported value keeps its sign.  Undefined
    /// coefficients come last.
    pub fn ranked_against(&self, target: NumericField) -> Vec<(NumericField, Option<f64>)> {
        if self.index(target).is_none() {
            return Vec::new();
        }
        let mut ranked: Vec<(NumericField, Option<f64>)> = self
            .fields
            .iter()
            .filter(|&&field| field != target)
            .map(|&field| (field, self.get(target, field)))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| match (a, b) {
            (Some(a), Some(b)) => b.abs().total_cmp(&a.abs()),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked
    }
}
