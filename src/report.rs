use std::path::Path;

use serde::Serialize;

use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::group::{cross_tab, group_means, value_counts, CrossTab, GroupedMeans, SortOrder};
use crate::analysis::insights::{key_insights, KeyInsights};
use crate::analysis::summary::{dashboard_metrics, MetricSummary};
use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalField, NumericField};

/// Report choices taken from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Target of the ranked correlation list.
    pub correlate_with: NumericField,
    /// Category for the grouped sleep means.
    pub group_by: CategoricalField,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            correlate_with: NumericField::SleepDuration,
            group_by: CategoricalField::Occupation,
        }
    }
}

/// Headless equivalent of the dashboard's overview, for `--summary`.
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub source: String,
    pub total_records: usize,
    pub filtered_records: usize,
    pub metrics: Vec<MetricSummary>,
    pub insights: KeyInsights,
    pub disorder_distribution: Vec<(String, usize)>,
    pub quality_distribution: Vec<(String, usize)>,
    pub sleep_by_group: GroupedMeans,
    pub disorders_by_age_group: CrossTab,
    pub correlation_target: NumericField,
    pub correlations: Vec<(NumericField, Option<f64>)>,
}

pub fn build_report(
    view: &FilteredView<'_>,
    source: &Path,
    options: &ReportOptions,
) -> DashboardReport {
    let correlations = CorrelationMatrix::compute(view);
    DashboardReport {
        source: source.display().to_string(),
        total_records: view.dataset().len(),
        filtered_records: view.len(),
        metrics: dashboard_metrics(view),
        insights: key_insights(view),
        disorder_distribution: value_counts(view, CategoricalField::SleepDisorderStatus),
        quality_distribution: value_counts(view, CategoricalField::SleepQualityCategory),
        sleep_by_group: group_means(
            view,
            options.group_by,
            &[
                NumericField::SleepDuration,
                NumericField::QualityOfSleep,
                NumericField::StressLevel,
            ],
            SortOrder::Descending,
        ),
        disorders_by_age_group: cross_tab(
            view,
            CategoricalField::AgeGroup,
            CategoricalField::SleepDisorderStatus,
        ),
        correlation_target: options.correlate_with,
        correlations: correlations.ranked_against(options.correlate_with),
    }
}

impl DashboardReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
