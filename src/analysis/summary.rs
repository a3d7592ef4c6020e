use serde::Serialize;

use super::stats::mean;
use crate::data::filter::FilteredView;
use crate::data::model::{NumericField, SleepRecord};

// ---------------------------------------------------------------------------
// Scalar metrics: filtered value vs. whole dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    /// Mean of a numeric field.
    Mean(NumericField),
    /// Share of respondents with a sleep disorder, in percent.
    DisorderRate,
}

impl Metric {
    /// The headline metrics shown above every dashboard tab.
    pub const DASHBOARD: [Metric; 4] = [
        Metric::Mean(NumericField::SleepDuration),
        Metric::Mean(NumericField::QualityOfSleep),
        Metric::Mean(NumericField::StressLevel),
        Metric::DisorderRate,
    ];

    pub fn label(self) -> String {
        match self {
            Metric::Mean(field) => format!("Average {field}"),
            Metric::DisorderRate => "Sleep Disorder Rate".to_string(),
        }
    }

    fn evaluate<'r>(self, records: impl Iterator<Item = &'r SleepRecord>) -> Option<f64> {
        match self {
            Metric::Mean(field) => mean(records.map(|r| r.numeric(field))),
            Metric::DisorderRate => {
                mean(records.map(|r| if r.has_disorder() { 100.0 } else { 0.0 }))
            }
        }
    }
}

/// A metric over the view, over the full dataset, and their signed difference.
/// `None` means "no data".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub label: String,
    pub metric: Metric,
    pub filtered: Option<f64>,
    pub overall: Option<f64>,
    pub delta: Option<f64>,
}

pub fn summarize(view: &FilteredView<'_>, metric: Metric) -> MetricSummary {
    let filtered = metric.evaluate(view.records());
    let overall = metric.evaluate(view.dataset().records.iter());
    let delta = filtered.zip(overall).map(|(f, o)| f - o);
    MetricSummary {
        label: metric.label(),
        metric,
        filtered,
        overall,
        delta,
    }
}

pub fn dashboard_metrics(view: &FilteredView<'_>) -> Vec<MetricSummary> {
    Metric::DASHBOARD
        .into_iter()
        .map(|metric| summarize(view, metric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterCriteria, FilterField};
    use crate::data::test_support::sample_dataset;

    #[test]
    fn full_view_has_zero_delta() {
        let dataset = sample_dataset();
        let summary = summarize(
            &FilteredView::all(&dataset),
            Metric::Mean(NumericField::SleepDuration),
        );
        assert_eq!(summary.filtered, summary.overall);
        assert_eq!(summary.delta, Some(0.0));
        assert_eq!(summary.label, "Average Sleep Duration");
    }

    #[test]
    fn delta_compares_against_full_dataset() {
        let dataset = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Doctor");
        let view = filter(&dataset, &criteria);
        let summary = summarize(&view, Metric::Mean(NumericField::SleepDuration));

        let filtered = summary.filtered.unwrap();
        let overall = summary.overall.unwrap();
        assert!((filtered - 7.0).abs() < 1e-9);
        assert!((summary.delta.unwrap() - (filtered - overall)).abs() < 1e-12);
    }

    #[test]
    fn disorder_rate_is_a_percentage() {
        let dataset = sample_dataset();
        let summary = summarize(&FilteredView::all(&dataset), Metric::DisorderRate);
        // 4 of 8 respondents report a disorder.
        assert_eq!(summary.filtered, Some(50.0));
    }

    #[test]
    fn empty_view_reports_no_data() {
        let dataset = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Astronaut");
        let view = filter(&dataset, &criteria);
        for summary in dashboard_metrics(&view) {
            assert_eq!(summary.filtered, None);
            assert!(summary.overall.is_some());
            assert_eq!(summary.delta, None);
        }
    }
}
