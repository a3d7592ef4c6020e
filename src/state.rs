use std::path::Path;
use std::sync::Arc;

use crate::analysis::distribution::Relationship;
use crate::data::export::write_export;
use crate::data::filter::{
    filter_options, filtered_indices, FilterCriteria, FilterField, FilteredView,
};
use crate::data::model::{
    CategoricalField, NumericField, SleepDataset, COL_AGE, COL_DISORDER_STATUS, COL_OCCUPATION,
    COL_QUALITY_OF_SLEEP, COL_SLEEP_DURATION, COL_STRESS_LEVEL,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Occupation,
    Correlations,
    Demographics,
    Explorer,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Occupation,
        Tab::Correlations,
        Tab::Demographics,
        Tab::Explorer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "📊 Overview",
            Tab::Occupation => "🏢 Occupation Analysis",
            Tab::Correlations => "📈 Correlations",
            Tab::Demographics => "👥 Demographics",
            Tab::Explorer => "🔍 Individual Explorer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Scatter,
    Box,
    Histogram,
    Bar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Scatter,
        ChartKind::Box,
        ChartKind::Histogram,
        ChartKind::Bar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Box => "Box Plot",
            ChartKind::Histogram => "Histogram",
            ChartKind::Bar => "Bar Chart",
        }
    }
}

/// Selections of the custom chart builder.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub x_axis: NumericField,
    pub y_axis: NumericField,
    pub group_by: CategoricalField,
    pub chart: ChartKind,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            x_axis: NumericField::Age,
            y_axis: NumericField::SleepDuration,
            group_by: CategoricalField::SleepDisorderStatus,
            chart: ChartKind::default(),
        }
    }
}

/// Columns shown in the data table before the user changes the selection.
pub const DEFAULT_TABLE_COLUMNS: [&str; 6] = [
    COL_OCCUPATION,
    COL_AGE,
    COL_SLEEP_DURATION,
    COL_QUALITY_OF_SLEEP,
    COL_STRESS_LEVEL,
    COL_DISORDER_STATUS,
];

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<SleepDataset>>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Picker choices per filter field, `"All"` first.
    pub filter_options: Vec<(FilterField, Vec<String>)>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    pub tab: Tab,
    pub relationship: Relationship,
    pub explorer: ExplorerState,

    /// Columns displayed in the data table.
    pub table_columns: Vec<String>,

    /// Fatal load error; nothing else renders while it is set.
    pub load_error: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            dataset: None,
            criteria,
            filter_options: Vec::new(),
            visible_indices: Vec::new(),
            tab: Tab::default(),
            relationship: Relationship::DurationVsQuality,
            explorer: ExplorerState::default(),
            table_columns: DEFAULT_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            load_error: None,
            status_message: None,
        }
    }

    /// Ingest the loaded dataset, build the filter pickers and apply the
    /// current criteria.
    pub fn set_dataset(&mut self, dataset: Arc<SleepDataset>) {
        self.filter_options = FilterField::ALL
            .iter()
            .map(|&field| (field, filter_options(&dataset, field)))
            .collect();
        self.dataset = Some(dataset);
        self.load_error = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
    }

    /// Change one filter (the `"All"` sentinel clears it) and refilter.
    pub fn set_filter(&mut self, field: FilterField, value: &str) {
        if self.criteria.selection(field) == value {
            return;
        }
        self.criteria.set(field, value);
        self.refilter();
    }

    /// The records currently visible, if a dataset is loaded.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_deref()
            .map(|ds| FilteredView::from_indices(ds, &self.visible_indices))
    }

    /// All columns the data table can show: source then derived.
    pub fn available_columns(&self) -> Vec<String> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        ds.columns
            .iter()
            .cloned()
            .chain(
                crate::data::derive::DerivedFeatures::COLUMNS
                    .iter()
                    .map(|c| c.to_string()),
            )
            .collect()
    }

    pub fn toggle_table_column(&mut self, column: &str) {
        if let Some(pos) = self.table_columns.iter().position(|c| c == column) {
            self.table_columns.remove(pos);
        } else {
            self.table_columns.push(column.to_string());
        }
    }

    /// Write the visible records to `path` and report the outcome.
    pub fn export_to(&mut self, path: &Path) {
        let result = match self.view() {
            Some(view) => write_export(&view, path),
            None => return,
        };
        match result {
            Ok(n) => {
                self.status_message = Some(format!("Exported {n} records to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::ALL;
    use crate::data::test_support::sample_dataset;

    fn loaded_state() -> AppState {
        let mut state = AppState::new(FilterCriteria::default());
        state.set_dataset(Arc::new(sample_dataset()));
        state
    }

    #[test]
    fn loading_shows_every_record() {
        let state = loaded_state();
        assert_eq!(state.visible_indices.len(), 8);
        assert_eq!(state.filter_options.len(), 3);
        let (field, options) = &state.filter_options[1];
        assert_eq!(*field, FilterField::Occupation);
        assert_eq!(options[0], ALL);
    }

    #[test]
    fn initial_criteria_apply_on_load() {
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Doctor");
        let mut state = AppState::new(criteria);
        state.set_dataset(Arc::new(sample_dataset()));
        assert_eq!(state.visible_indices, vec![1, 7]);
    }

    #[test]
    fn changing_a_filter_refilters() {
        let mut state = loaded_state();
        state.set_filter(FilterField::AgeGroup, "18-29");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        state.set_filter(FilterField::DisorderStatus, "Insomnia");
        assert_eq!(state.visible_indices, vec![2]);
        state.set_filter(FilterField::AgeGroup, ALL);
        assert_eq!(state.visible_indices, vec![2, 3, 4]);
        assert_eq!(state.view().unwrap().len(), 3);
    }

    #[test]
    fn table_columns_toggle() {
        let mut state = loaded_state();
        assert!(state.available_columns().contains(&"Sleep Efficiency".to_string()));
        state.toggle_table_column("Age");
        assert!(!state.table_columns.contains(&"Age".to_string()));
        state.toggle_table_column("Age");
        assert_eq!(state.table_columns.last().map(String::as_str), Some("Age"));
    }

    #[test]
    fn export_reports_status() {
        let mut state = loaded_state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        state.export_to(&path);
        assert!(path.exists());
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Exported 8 records"));
    }
}
