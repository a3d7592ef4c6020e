use eframe::egui::{self, Color32, RichText, Ui};

use crate::analysis::summary::{dashboard_metrics, Metric, MetricSummary};
use crate::data::filter::FilterField;
use crate::data::model::NumericField;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

fn filter_title(field: FilterField) -> &'static str {
    match field {
        FilterField::AgeGroup => "Select Age Group",
        FilterField::Occupation => "Select Occupation",
        FilterField::DisorderStatus => "Select Sleep Disorder Status",
    }
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters & Controls");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the choices so the combo boxes can mutate state.
    let options = state.filter_options.clone();
    for (field, choices) in &options {
        ui.strong(filter_title(*field));
        let current = state.criteria.selection(*field).to_string();
        egui::ComboBox::from_id_salt(filter_title(*field))
            .selected_text(&current)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                for choice in choices {
                    if ui.selectable_label(current == *choice, choice).clicked() {
                        state.set_filter(*field, choice);
                    }
                }
            });
        ui.add_space(6.0);
    }

    ui.separator();
    ui.label(
        RichText::new(format!(
            "Filtered Dataset: {} participants",
            state.visible_indices.len()
        ))
        .strong(),
    );
    ui.label(format!("Total Dataset: {} participants", dataset.len()));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(
            RichText::new("😴 Sleep Health & Lifestyle Analysis Dashboard")
                .color(Color32::from_rgb(31, 119, 180)),
        );

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} participants loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

fn format_metric(summary: &MetricSummary) -> (String, String) {
    let no_data = || ("No data".to_string(), String::new());
    let (Some(value), Some(delta)) = (summary.filtered, summary.delta) else {
        return no_data();
    };
    match summary.metric {
        Metric::Mean(NumericField::SleepDuration) => (
            format!("{value:.2} hours"),
            format!("{delta:+.2}h vs overall"),
        ),
        Metric::Mean(_) => (format!("{value:.1}/10"), format!("{delta:+.1} vs overall")),
        Metric::DisorderRate => (format!("{value:.1}%"), format!("{delta:+.1}% vs overall")),
    }
}

/// Four metric cards: filtered value with the delta against the whole dataset.
pub fn metrics_row(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.view() else {
        return;
    };
    let metrics = dashboard_metrics(&view);

    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, summary) in cols.iter_mut().zip(&metrics) {
            let (value, delta) = format_metric(summary);
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.label(&summary.label);
                ui.label(RichText::new(value).size(22.0).strong());
                if let Some(d) = summary.delta {
                    let color = if d >= 0.0 {
                        Color32::from_rgb(46, 139, 87)
                    } else {
                        Color32::from_rgb(200, 60, 60)
                    };
                    ui.label(RichText::new(delta).color(color).small());
                }
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Tab selector
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}
