use eframe::egui::{self, RichText, Ui};

use super::{plot, table};
use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::distribution::{box_stats, histogram, scatter, Relationship};
use crate::analysis::group::{cross_tab, group_means, value_counts, GroupedMeans, SortOrder};
use crate::analysis::insights::{key_insights, Extremum, KeyInsights};
use crate::analysis::stats::mean;
use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalField, NumericField};
use crate::state::{AppState, ChartKind, ExplorerState};

const HISTOGRAM_BINS: usize = 20;

/// Metrics compared side by side on the demographics tab.
const SLEEP_METRICS: [NumericField; 3] = [
    NumericField::SleepDuration,
    NumericField::QualityOfSleep,
    NumericField::StressLevel,
];

/// Grouping choices of the custom chart builder.
const EXPLORER_GROUPS: [CategoricalField; 5] = [
    CategoricalField::SleepDisorderStatus,
    CategoricalField::AgeGroup,
    CategoricalField::Occupation,
    CategoricalField::ActivityLevel,
    CategoricalField::SleepQualityCategory,
];

fn subheading(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).strong().size(16.0));
}

/// The visible records, or `None` after showing a notice when nothing matches.
fn visible<'s>(ui: &mut Ui, state: &'s AppState) -> Option<FilteredView<'s>> {
    let view = state.view()?;
    if view.is_empty() {
        ui.label(RichText::new("No participants match the current filters.").italics());
        return None;
    }
    Some(view)
}

fn counts_chart(ui: &mut Ui, id: &str, counts: &[(String, usize)]) {
    let series: Vec<(&str, f64)> = counts
        .iter()
        .map(|(key, n)| (key.as_str(), *n as f64))
        .collect();
    plot::bar_chart(ui, id, &series, false, "Count");
}

fn mean_chart(ui: &mut Ui, id: &str, means: &GroupedMeans, horizontal: bool) {
    let Some(&field) = means.fields.first() else {
        plot::no_data(ui);
        return;
    };
    let label = format!("Average {}", field.label());
    plot::bar_chart(ui, id, &means.series(field), horizontal, &label);
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn insight_line(title: &str, insight: Option<&Extremum>, fmt: fn(f64) -> String) -> String {
    match insight {
        Some(e) => format!("{title}: {} ({})", e.key, fmt(e.value)),
        None => format!("{title}: No data"),
    }
}

fn insight_lines(insights: &KeyInsights) -> [String; 3] {
    let hours = |v: f64| format!("{v:.2}h");
    let score = |v: f64| format!("{v:.1}/10");
    [
        insight_line(
            "Best Sleeping Occupation",
            insights.best_sleeping_occupation.as_ref(),
            hours,
        ),
        insight_line(
            "Highest Stress Disorder",
            insights.highest_stress_disorder.as_ref(),
            score,
        ),
        insight_line(
            "Best Sleeping Age Group",
            insights.best_sleeping_age_group.as_ref(),
            hours,
        ),
    ]
}

pub fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Sleep Health Overview");
    let Some(view) = visible(ui, state) else {
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        subheading(&mut cols[0], "Sleep Disorder Distribution");
        counts_chart(
            &mut cols[0],
            "disorder_counts",
            &value_counts(&view, CategoricalField::SleepDisorderStatus),
        );
        subheading(&mut cols[1], "Sleep Quality Distribution");
        counts_chart(
            &mut cols[1],
            "quality_counts",
            &value_counts(&view, CategoricalField::SleepQualityCategory),
        );
    });

    subheading(ui, "Sleep Duration Distribution");
    let field = NumericField::SleepDuration;
    plot::histogram(
        ui,
        "duration_histogram",
        &histogram(&view, field, HISTOGRAM_BINS),
        "Sleep Duration (hours)",
        mean(view.records().map(|r| r.numeric(field))),
    );

    subheading(ui, "🔑 Key Insights");
    let lines = insight_lines(&key_insights(&view));
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.columns(lines.len(), |cols: &mut [Ui]| {
            for (col, line) in cols.iter_mut().zip(&lines) {
                col.label(line);
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Occupation analysis
// ---------------------------------------------------------------------------

pub fn occupation(ui: &mut Ui, state: &AppState) {
    ui.heading("🏢 Occupation Analysis");
    let Some(view) = visible(ui, state) else {
        return;
    };

    subheading(ui, "Average Sleep Duration by Occupation");
    let by = CategoricalField::Occupation;
    mean_chart(
        ui,
        "occupation_sleep",
        &group_means(&view, by, &[NumericField::SleepDuration], SortOrder::Ascending),
        true,
    );

    ui.columns(2, |cols: &mut [Ui]| {
        subheading(&mut cols[0], "Sleep Quality by Occupation");
        mean_chart(
            &mut cols[0],
            "occupation_quality",
            &group_means(&view, by, &[NumericField::QualityOfSleep], SortOrder::Descending),
            true,
        );
        subheading(&mut cols[1], "Stress Level by Occupation");
        mean_chart(
            &mut cols[1],
            "occupation_stress",
            &group_means(&view, by, &[NumericField::StressLevel], SortOrder::Ascending),
            true,
        );
    });

    subheading(ui, "Sleep Disorders by Occupation");
    plot::stacked_percentages(
        ui,
        "occupation_disorders",
        &cross_tab(&view, by, CategoricalField::SleepDisorderStatus),
    );
}

// ---------------------------------------------------------------------------
// Correlations
// ---------------------------------------------------------------------------

fn ranked_chart(ui: &mut Ui, id: &str, matrix: &CorrelationMatrix, target: NumericField) {
    let ranked = matrix.ranked_against(target);
    let series: Vec<(&str, f64)> = ranked
        .iter()
        .filter_map(|(field, r)| r.map(|r| (field.label(), r)))
        .collect();
    plot::bar_chart(ui, id, &series, true, "Correlation");
}

pub fn correlations(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📈 Correlation Analysis");

    egui::ComboBox::from_label("Select Relationship to Explore")
        .selected_text(state.relationship.label())
        .show_ui(ui, |ui: &mut Ui| {
            for relationship in Relationship::ALL {
                ui.selectable_value(&mut state.relationship, relationship, relationship.label());
            }
        });

    let Some(view) = visible(ui, state) else {
        return;
    };
    let matrix = CorrelationMatrix::compute(&view);

    subheading(ui, "Correlation Matrix of Sleep Health Factors");
    plot::heatmap(ui, &matrix);

    ui.columns(2, |cols: &mut [Ui]| {
        subheading(&mut cols[0], "Sleep Duration Correlations");
        ranked_chart(
            &mut cols[0],
            "duration_correlations",
            &matrix,
            NumericField::SleepDuration,
        );
        subheading(&mut cols[1], "Sleep Quality Correlations");
        ranked_chart(
            &mut cols[1],
            "quality_correlations",
            &matrix,
            NumericField::QualityOfSleep,
        );
    });

    subheading(ui, "Key Relationships");
    let (x, y, _) = state.relationship.axes();
    plot::scatter(
        ui,
        "relationship_scatter",
        &state.relationship.points(&view),
        x.label(),
        y.label(),
    );
}

// ---------------------------------------------------------------------------
// Demographics
// ---------------------------------------------------------------------------

pub fn demographics(ui: &mut Ui, state: &AppState) {
    ui.heading("👥 Demographic Analysis");
    let Some(view) = visible(ui, state) else {
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        subheading(&mut cols[0], "Sleep Patterns by Age Group");
        plot::grouped_bars(
            &mut cols[0],
            "age_metrics",
            &group_means(&view, CategoricalField::AgeGroup, &SLEEP_METRICS, SortOrder::ByKey),
        );
        subheading(&mut cols[1], "Sleep Disorders by Age Group");
        plot::stacked_percentages(
            &mut cols[1],
            "age_disorders",
            &cross_tab(
                &view,
                CategoricalField::AgeGroup,
                CategoricalField::SleepDisorderStatus,
            ),
        );
    });

    if view.dataset().has_gender() {
        ui.columns(2, |cols: &mut [Ui]| {
            subheading(&mut cols[0], "Sleep Duration by Gender");
            mean_chart(
                &mut cols[0],
                "gender_sleep",
                &group_means(
                    &view,
                    CategoricalField::Gender,
                    &[NumericField::SleepDuration],
                    SortOrder::ByKey,
                ),
                false,
            );
            subheading(&mut cols[1], "Sleep Disorders by Gender");
            plot::stacked_percentages(
                &mut cols[1],
                "gender_disorders",
                &cross_tab(
                    &view,
                    CategoricalField::Gender,
                    CategoricalField::SleepDisorderStatus,
                ),
            );
        });
    }

    subheading(ui, "Physical Activity Impact");
    plot::grouped_bars(
        ui,
        "activity_metrics",
        &group_means(
            &view,
            CategoricalField::ActivityLevel,
            &SLEEP_METRICS,
            SortOrder::ByKey,
        ),
    );
}

// ---------------------------------------------------------------------------
// Individual explorer
// ---------------------------------------------------------------------------

fn picker<T: Copy + PartialEq>(
    ui: &mut Ui,
    label: &str,
    current: &mut T,
    choices: &[T],
    name: fn(T) -> &'static str,
) {
    egui::ComboBox::from_label(label)
        .selected_text(name(*current))
        .show_ui(ui, |ui: &mut Ui| {
            for &choice in choices {
                ui.selectable_value(current, choice, name(choice));
            }
        });
}

fn explorer_controls(ui: &mut Ui, explorer: &mut ExplorerState) {
    ui.columns(2, |cols: &mut [Ui]| {
        picker(
            &mut cols[0],
            "Select X-axis",
            &mut explorer.x_axis,
            &NumericField::ALL,
            NumericField::label,
        );
        picker(
            &mut cols[0],
            "Select Chart Type",
            &mut explorer.chart,
            &ChartKind::ALL,
            ChartKind::label,
        );

        let group_label = if explorer.chart == ChartKind::Scatter {
            picker(
                &mut cols[1],
                "Select Y-axis",
                &mut explorer.y_axis,
                &NumericField::ALL,
                NumericField::label,
            );
            "Color by"
        } else {
            "Group by"
        };
        picker(
            &mut cols[1],
            group_label,
            &mut explorer.group_by,
            &EXPLORER_GROUPS,
            CategoricalField::label,
        );
    });
}

fn explorer_chart(ui: &mut Ui, view: &FilteredView<'_>, explorer: &ExplorerState) {
    let ExplorerState {
        x_axis: x,
        y_axis: y,
        group_by,
        chart,
    } = *explorer;

    match chart {
        ChartKind::Scatter => {
            subheading(ui, &format!("{} vs {}", x.label(), y.label()));
            plot::scatter(
                ui,
                "explorer_scatter",
                &scatter(view, x, y, group_by),
                x.label(),
                y.label(),
            );
        }
        ChartKind::Box => {
            subheading(ui, &format!("{} by {}", x.label(), group_by.label()));
            plot::box_plot(ui, "explorer_box", &box_stats(view, x, group_by), x.label());
        }
        ChartKind::Histogram => {
            subheading(ui, &format!("{} Distribution", x.label()));
            plot::histogram(
                ui,
                "explorer_histogram",
                &histogram(view, x, HISTOGRAM_BINS),
                x.label(),
                mean(view.records().map(|r| r.numeric(x))),
            );
        }
        ChartKind::Bar => {
            subheading(ui, &format!("Average {} by {}", x.label(), group_by.label()));
            mean_chart(
                ui,
                "explorer_bar",
                &group_means(view, group_by, &[x], SortOrder::ByKey),
                false,
            );
        }
    }
}

fn column_picker(ui: &mut Ui, state: &mut AppState) {
    let available = state.available_columns();
    let mut toggled: Option<String> = None;
    ui.menu_button(
        format!("Select columns to display ({})", state.table_columns.len()),
        |ui: &mut Ui| {
            for column in &available {
                let mut shown = state.table_columns.contains(column);
                if ui.checkbox(&mut shown, column.as_str()).changed() {
                    toggled = Some(column.clone());
                }
            }
        },
    );
    if let Some(column) = toggled {
        state.toggle_table_column(&column);
    }
}

pub fn explorer(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Individual Data Explorer");

    subheading(ui, "Custom Analysis Builder");
    explorer_controls(ui, &mut state.explorer);
    if let Some(view) = state.view() {
        explorer_chart(ui, &view, &state.explorer);
    }

    ui.separator();
    subheading(ui, "Filtered Data Table");
    column_picker(ui, state);
    if let Some(view) = state.view() {
        table::data_table(ui, &view, &state.table_columns);
    }

    ui.add_space(8.0);
    if ui.button("📥 Download Filtered Data").clicked() {
        let target = rfd::FileDialog::new()
            .set_file_name("filtered_sleep_data.csv")
            .add_filter("CSV", &["csv"])
            .save_file();
        if let Some(path) = target {
            state.export_to(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterCriteria, FilterField};
    use crate::data::test_support::sample_dataset;

    #[test]
    fn insight_lines_format_each_finding() {
        let ds = sample_dataset();
        let lines = insight_lines(&key_insights(&FilteredView::all(&ds)));
        assert_eq!(lines[0], "Best Sleeping Occupation: Engineer (8.30h)");
        assert_eq!(lines[1], "Highest Stress Disorder: Insomnia (6.3/10)");
        assert_eq!(lines[2], "Best Sleeping Age Group: 50-59 (8.20h)");
    }

    #[test]
    fn insight_lines_without_data() {
        let ds = sample_dataset();
        let criteria = FilterCriteria::default().with(FilterField::Occupation, "Pilot");
        let lines = insight_lines(&key_insights(&filter(&ds, &criteria)));
        assert!(lines.iter().all(|l| l.ends_with(": No data")));
    }
}
