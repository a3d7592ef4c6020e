use std::collections::BTreeMap;

use serde::Serialize;

use super::stats::quantile;
use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalField, NumericField};

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins spanning the observed range of `field`.
///
/// An empty view has no bins; a constant field collapses into one bin.
pub fn histogram(view: &FilteredView<'_>, field: NumericField, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = view.records().map(|r| r.numeric(field)).collect();
    let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        })
    }) else {
        return Vec::new();
    };

    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    if width == 0.0 {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary of one group with 1.5×IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub key: String,
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// Box statistics of `field` for each value of `by`, in key order.
pub fn box_stats(
    view: &FilteredView<'_>,
    field: NumericField,
    by: CategoricalField,
) -> Vec<BoxStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in view.records() {
        if let Some(key) = record.category(by) {
            groups.entry(key).or_default().push(record.numeric(field));
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            let q1 = quantile(&values, 0.25)?;
            let median = quantile(&values, 0.5)?;
            let q3 = quantile(&values, 0.75)?;
            let reach = 1.5 * (q3 - q1);
            // Whiskers stop at the most extreme observations inside the fence.
            let lower_whisker = values.iter().copied().find(|&v| v >= q1 - reach)?;
            let upper_whisker = values.iter().rev().copied().find(|&v| v <= q3 + reach)?;
            Some(BoxStats {
                key: key.to_string(),
                count: values.len(),
                lower_whisker,
                q1,
                median,
                q3,
                upper_whisker,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub group: String,
}

/// One point per record, labelled with the record's `color_by` value.
pub fn scatter(
    view: &FilteredView<'_>,
    x: NumericField,
    y: NumericField,
    color_by: CategoricalField,
) -> Vec<ScatterPoint> {
    view.records()
        .map(|r| ScatterPoint {
            x: r.numeric(x),
            y: r.numeric(y),
            group: r.category(color_by).unwrap_or("Unknown").to_string(),
        })
        .collect()
}

/// Preset relationships offered on the correlation tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    DurationVsQuality,
    StressVsDuration,
    StepsVsDuration,
    AgeVsDuration,
}

impl Relationship {
    pub const ALL: [Relationship; 4] = [
        Relationship::DurationVsQuality,
        Relationship::StressVsDuration,
        Relationship::StepsVsDuration,
        Relationship::AgeVsDuration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Relationship::DurationVsQuality => "Sleep Duration vs Quality",
            Relationship::StressVsDuration => "Stress vs Sleep Duration",
            Relationship::StepsVsDuration => "Daily Steps vs Sleep Duration",
            Relationship::AgeVsDuration => "Age vs Sleep Duration",
        }
    }

    /// `(x, y, color_by)` axes of the relationship.
    pub fn axes(self) -> (NumericField, NumericField, CategoricalField) {
        match self {
            Relationship::DurationVsQuality => (
                NumericField::SleepDuration,
                NumericField::QualityOfSleep,
                CategoricalField::SleepDisorderStatus,
            ),
            Relationship::StressVsDuration => (
                NumericField::StressLevel,
                NumericField::SleepDuration,
                CategoricalField::SleepDisorderStatus,
            ),
            Relationship::StepsVsDuration => (
                NumericField::DailySteps,
                NumericField::SleepDuration,
                CategoricalField::ActivityLevel,
            ),
            Relationship::AgeVsDuration => (
                NumericField::Age,
                NumericField::SleepDuration,
                CategoricalField::SleepDisorderStatus,
            ),
        }
    }

    pub fn points(self, view: &FilteredView<'_>) -> Vec<ScatterPoint> {
        let (x, y, color_by) = self.axes();
        scatter(view, x, y, color_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterCriteria, FilterField};
    use crate::data::test_support::{dataset_from, sample_dataset};

    #[test]
    fn histogram_counts_every_record() {
        let dataset = sample_dataset();
        let bins = histogram(&FilteredView::all(&dataset), NumericField::SleepDuration, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), dataset.len());
        assert_eq!(bins[0].start, 6.1);
        assert!((bins[19].end - 8.3).abs() < 1e-9);
        // The maximum lands in the last bin rather than past it.
        assert!(bins[19].count >= 1);
    }

    #[test]
    fn histogram_of_constant_field_is_one_bin() {
        let dataset = dataset_from(&[(7.0, "Nurse"), (7.0, "Doctor")]);
        let bins = histogram(&FilteredView::all(&dataset), NumericField::SleepDuration, 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].width(), 0.0);
    }

    #[test]
    fn histogram_of_empty_view_is_empty() {
        let dataset = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Astronaut");
        let view = filter(&dataset, &criteria);
        assert!(histogram(&view, NumericField::Age, 10).is_empty());
        assert!(box_stats(&view, NumericField::Age, CategoricalField::Occupation).is_empty());
        assert!(scatter(
            &view,
            NumericField::Age,
            NumericField::SleepDuration,
            CategoricalField::Occupation
        )
        .is_empty());
    }

    #[test]
    fn box_stats_per_group() {
        let dataset = dataset_from(&[
            (6.0, "Nurse"),
            (7.0, "Nurse"),
            (8.0, "Nurse"),
            (9.0, "Nurse"),
            (5.0, "Doctor"),
        ]);
        let stats = box_stats(
            &FilteredView::all(&dataset),
            NumericField::SleepDuration,
            CategoricalField::Occupation,
        );
        assert_eq!(stats.len(), 2);

        let doctor = &stats[0];
        assert_eq!(doctor.key, "Doctor");
        assert_eq!(doctor.median, 5.0);
        assert_eq!(doctor.lower_whisker, 5.0);

        let nurse = &stats[1];
        assert_eq!(nurse.count, 4);
        assert_eq!(nurse.q1, 6.75);
        assert_eq!(nurse.median, 7.5);
        assert_eq!(nurse.q3, 8.25);
        assert_eq!(nurse.lower_whisker, 6.0);
        assert_eq!(nurse.upper_whisker, 9.0);
    }

    #[test]
    fn relationship_points_follow_axes() {
        let dataset = sample_dataset();
        let points = Relationship::StepsVsDuration.points(&FilteredView::all(&dataset));
        assert_eq!(points.len(), dataset.len());
        assert_eq!(points[0].x, 4200.0);
        assert_eq!(points[0].y, 6.1);
        assert_eq!(points[0].group, "Low Activity");
    }
}
