use serde::Serialize;

use super::group::{group_means, SortOrder};
use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalField, NumericField};

/// A group key with the mean that made it stand out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremum {
    pub key: String,
    pub value: f64,
}

/// Headline findings of the overview tab; `None` when the view has no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInsights {
    pub best_sleeping_occupation: Option<Extremum>,
    pub highest_stress_disorder: Option<Extremum>,
    pub best_sleeping_age_group: Option<Extremum>,
}

fn max_mean(
    view: &FilteredView<'_>,
    by: CategoricalField,
    field: NumericField,
) -> Option<Extremum> {
    group_means(view, by, &[field], SortOrder::ByKey)
        .max_by(field)
        .map(|(key, value)| Extremum {
            key: key.to_string(),
            value,
        })
}

pub fn key_insights(view: &FilteredView<'_>) -> KeyInsights {
    // Only respondents with a disorder compete for "highest stress".
    let with_disorder: Vec<usize> = view
        .indices()
        .iter()
        .copied()
        .filter(|&i| view.dataset().records[i].has_disorder())
        .collect();
    let disorder_view = FilteredView::from_indices(view.dataset(), &with_disorder);

    KeyInsights {
        best_sleeping_occupation: max_mean(
            view,
            CategoricalField::Occupation,
            NumericField::SleepDuration,
        ),
        highest_stress_disorder: max_mean(
            &disorder_view,
            CategoricalField::SleepDisorderStatus,
            NumericField::StressLevel,
        ),
        best_sleeping_age_group: max_mean(
            view,
            CategoricalField::AgeGroup,
            NumericField::SleepDuration,
        ),
    }
}
