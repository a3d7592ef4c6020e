use std::borrow::Cow;
use std::collections::HashSet;

use super::model::{CategoricalField, SleepDataset, SleepRecord};

// ---------------------------------------------------------------------------
// Filter criteria: equality constraints on three categorical fields
// ---------------------------------------------------------------------------

/// Selection value meaning "no constraint on this field".
pub const ALL: &str = "All";

/// The fields a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    AgeGroup,
    Occupation,
    DisorderStatus,
}

impl FilterField {
    pub const ALL: [FilterField; 3] = [
        FilterField::AgeGroup,
        FilterField::Occupation,
        FilterField::DisorderStatus,
    ];

    pub fn categorical(self) -> CategoricalField {
        match self {
            FilterField::AgeGroup => CategoricalField::AgeGroup,
            FilterField::Occupation => CategoricalField::Occupation,
            FilterField::DisorderStatus => CategoricalField::SleepDisorderStatus,
        }
    }
}

/// Active constraints; `None` means the field is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub age_group: Option<String>,
    pub occupation: Option<String>,
    pub disorder_status: Option<String>,
}

impl FilterCriteria {
    /// Set one constraint. The [`ALL`] sentinel clears it.
    pub fn set(&mut self, field: FilterField, value: &str) {
        let value = (value != ALL).then(|| value.to_string());
        *self.slot_mut(field) = value;
    }

    pub fn with(mut self, field: FilterField, value: &str) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::AgeGroup => self.age_group.as_deref(),
            FilterField::Occupation => self.occupation.as_deref(),
            FilterField::DisorderStatus => self.disorder_status.as_deref(),
        }
    }

    /// The selection as shown in a picker: the value or [`ALL`].
    pub fn selection(&self, field: FilterField) -> &str {
        self.get(field).unwrap_or(ALL)
    }

    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::AgeGroup => &mut self.age_group,
            FilterField::Occupation => &mut self.occupation,
            FilterField::DisorderStatus => &mut self.disorder_status,
        }
    }

    /// A record passes when every active constraint matches exactly.
    pub fn matches(&self, record: &SleepRecord) -> bool {
        FilterField::ALL.iter().all(|field| match self.get(*field) {
            None => true,
            Some(wanted) => record.category(field.categorical()) == Some(wanted),
        })
    }
}

// ---------------------------------------------------------------------------
// FilteredView – a borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// Records of a dataset selected by index. Never mutates the dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SleepDataset,
    indices: Cow<'a, [usize]>,
}

impl<'a> FilteredView<'a> {
    /// The whole dataset.
    pub fn all(dataset: &'a SleepDataset) -> Self {
        FilteredView {
            dataset,
            indices: Cow::Owned((0..dataset.len()).collect()),
        }
    }

    /// Wrap indices computed earlier (e.g. cached in UI state).
    pub fn from_indices(dataset: &'a SleepDataset, indices: &'a [usize]) -> Self {
        FilteredView {
            dataset,
            indices: Cow::Borrowed(indices),
        }
    }

    pub fn dataset(&self) -> &'a SleepDataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a SleepRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

/// Apply `criteria` to the dataset (logical AND of all active constraints).
pub fn filter<'a>(dataset: &'a SleepDataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    FilteredView {
        dataset,
        indices: Cow::Owned(filtered_indices(dataset, criteria)),
    }
}

/// Indices of the records passing `criteria`, in dataset order.
pub fn filtered_indices(dataset: &SleepDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Picker choices for a filter: [`ALL`] followed by the distinct values in
/// order of first appearance.
pub fn filter_options(dataset: &SleepDataset, field: FilterField) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut options = vec![ALL.to_string()];
    for record in &dataset.records {
        if let Some(value) = record.category(field.categorical()) {
            if seen.insert(value) {
                options.push(value.to_string());
            }
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::sample_dataset;

    #[test]
    fn empty_criteria_is_identity() {
        let dataset = sample_dataset();
        let view = filter(&dataset, &FilterCriteria::default());
        assert_eq!(view.len(), dataset.len());
        assert!(view.records().zip(&dataset.records).all(|(a, b)| a == b));
    }

    #[test]
    fn single_constraint_keeps_only_matches() {
        let dataset = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Nurse");
        let view = filter(&dataset, &criteria);
        assert!(!view.is_empty());
        assert!(view.records().all(|r| r.raw.occupation == "Nurse"));
        let expected = dataset
            .records
            .iter()
            .filter(|r| r.raw.occupation == "Nurse")
            .count();
        assert_eq!(view.len(), expected);
    }

    #[test]
    fn two_constraints_intersect() {
        let dataset = sample_dataset();
        let nurses = FilterCriteria::default().with(FilterField::Occupation, "Nurse");
        let insomnia =
            FilterCriteria::default().with(FilterField::DisorderStatus, "Insomnia");
        let both = nurses.clone().with(FilterField::DisorderStatus, "Insomnia");

        let a: HashSet<usize> = filtered_indices(&dataset, &nurses).into_iter().collect();
        let b: HashSet<usize> = filtered_indices(&dataset, &insomnia).into_iter().collect();
        let ab: HashSet<usize> = filtered_indices(&dataset, &both).into_iter().collect();

        let expected: HashSet<usize> = a.intersection(&b).copied().collect();
        assert_eq!(ab, expected);
        assert!(!ab.is_empty());
    }

    #[test]
    fn all_sentinel_clears_constraint() {
        let mut criteria = FilterCriteria::default().with(FilterField::AgeGroup, "30-39");
        assert_eq!(criteria.selection(FilterField::AgeGroup), "30-39");
        criteria.set(FilterField::AgeGroup, ALL);
        assert!(criteria.is_empty());
        assert_eq!(criteria.selection(FilterField::AgeGroup), ALL);
    }

    #[test]
    fn no_match_yields_empty_view() {
        let dataset = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Astronaut");
        let view = filter(&dataset, &criteria);
        assert!(view.is_empty());
        assert_eq!(view.records().count(), 0);
    }

    #[test]
    fn options_start_with_all_in_appearance_order() {
        let dataset = sample_dataset();
        let options = filter_options(&dataset, FilterField::DisorderStatus);
        assert_eq!(options, vec!["All", "No Disorder", "Insomnia", "Sleep Apnea"]);
    }

    #[test]
    fn view_from_cached_indices() {
        let dataset = sample_dataset();
        let indices = vec![0, 2];
        let view = FilteredView::from_indices(&dataset, &indices);
        assert_eq!(view.len(), 2);
        assert_eq!(view.records().nth(1), Some(&dataset.records[2]));
    }
}
