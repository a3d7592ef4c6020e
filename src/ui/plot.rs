use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, LineStyle, Plot, PlotPoints, Points,
    VLine,
};

use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::distribution::{BoxStats, HistogramBin, ScatterPoint};
use crate::analysis::group::{CrossTab, GroupedMeans};
use crate::color::{diverging, diverging_text, generate_palette, ColorMap};

const PLOT_HEIGHT: f32 = 320.0;

/// Placeholder for charts over an empty view.
pub fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No data for the current filters.").italics());
}

/// Axis formatter that prints category names at integer positions.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// One bar per category, each in its own colour.
pub fn bar_chart(
    ui: &mut Ui,
    id: &str,
    series: &[(&str, f64)],
    horizontal: bool,
    value_label: &str,
) {
    if series.is_empty() {
        no_data(ui);
        return;
    }
    let colors = generate_palette(series.len());
    let bars: Vec<Bar> = series
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((name, value), color))| {
            Bar::new(i as f64, *value).name(*name).fill(color).width(0.7)
        })
        .collect();

    let mut chart = BarChart::new(bars);
    if horizontal {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = series.iter().map(|(n, _)| n.to_string()).collect();
    let mut plot = Plot::new(id)
        .height(PLOT_HEIGHT.max(series.len() as f32 * 22.0))
        .allow_scroll(false);
    plot = if horizontal {
        plot.y_axis_formatter(category_formatter(labels))
            .x_axis_label(value_label)
    } else {
        plot.x_axis_formatter(category_formatter(labels))
            .y_axis_label(value_label)
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Side-by-side bars, one series per requested field.
pub fn grouped_bars(ui: &mut Ui, id: &str, means: &GroupedMeans) {
    if means.is_empty() {
        no_data(ui);
        return;
    }
    let n_fields = means.fields.len().max(1);
    let width = 0.8 / n_fields as f64;
    let colors = generate_palette(n_fields);

    let charts: Vec<BarChart> = means
        .fields
        .iter()
        .enumerate()
        .map(|(f, field)| {
            let bars = means
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let x = i as f64 - 0.4 + width * (f as f64 + 0.5);
                    Bar::new(x, row.values[f]).width(width).name(&row.key)
                })
                .collect();
            BarChart::new(bars).name(field.label()).color(colors[f])
        })
        .collect();

    let labels: Vec<String> = means.rows.iter().map(|r| r.key.clone()).collect();
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// 100%-stacked bars of a cross-tabulation, one stack per row key.
pub fn stacked_percentages(ui: &mut Ui, id: &str, tab: &CrossTab) {
    if tab.is_empty() {
        no_data(ui);
        return;
    }
    let colors = ColorMap::new(tab.col_keys.iter().map(String::as_str));

    let mut charts: Vec<BarChart> = Vec::with_capacity(tab.col_keys.len());
    for (c, col_key) in tab.col_keys.iter().enumerate() {
        let bars = tab
            .percentages
            .iter()
            .enumerate()
            .map(|(r, row)| Bar::new(r as f64, row[c]).width(0.7).name(&tab.row_keys[r]))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(col_key)
            .color(colors.color_for(col_key))
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .include_y(100.0)
        .y_axis_label("Percentage (%)")
        .x_axis_formatter(category_formatter(tab.row_keys.clone()))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Histogram bars with an optional dashed mean marker.
pub fn histogram(ui: &mut Ui, id: &str, bins: &[HistogramBin], x_label: &str, mean: Option<f64>) {
    if bins.is_empty() {
        no_data(ui);
        return;
    }
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            let width = if b.width() > 0.0 { b.width() } else { 0.1 };
            Bar::new(b.center(), b.count as f64)
                .width(width)
                .fill(Color32::from_rgb(31, 119, 180))
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(x_label));
            if let Some(m) = mean {
                plot_ui.vline(
                    VLine::new(m)
                        .name(format!("Mean: {m:.2}"))
                        .style(LineStyle::dashed_loose())
                        .color(Color32::DARK_RED),
                );
            }
        });
}

/// One box per group.
pub fn box_plot(ui: &mut Ui, id: &str, stats: &[BoxStats], value_label: &str) {
    if stats.is_empty() {
        no_data(ui);
        return;
    }
    let colors = ColorMap::new(stats.iter().map(|s| s.key.as_str()));
    let boxes: Vec<BoxElem> = stats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(&s.key)
            .fill(colors.color_for(&s.key).linear_multiply(0.4))
            .stroke(egui::Stroke::new(1.5, colors.color_for(&s.key)))
            .box_width(0.6)
        })
        .collect();

    let labels: Vec<String> = stats.iter().map(|s| s.key.clone()).collect();
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .y_axis_label(value_label)
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| plot_ui.box_plot(BoxPlot::new(boxes)));
}

/// Scatter points coloured by group, one legend entry per group.
pub fn scatter(ui: &mut Ui, id: &str, points: &[ScatterPoint], x_label: &str, y_label: &str) {
    if points.is_empty() {
        no_data(ui);
        return;
    }
    let mut groups: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        groups.entry(p.group.as_str()).or_default().push([p.x, p.y]);
    }
    let colors = ColorMap::new(groups.keys().copied());

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for (group, xy) in groups {
                let series: PlotPoints = xy.into_iter().collect();
                plot_ui.points(
                    Points::new(series)
                        .name(group)
                        .color(colors.color_for(group))
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Coefficient grid on a blue–white–red scale; undefined cells show "–".
pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for field in &matrix.fields {
                ui.label(RichText::new(field.label()).small().strong());
            }
            ui.end_row();

            for (i, field) in matrix.fields.iter().enumerate() {
                ui.label(RichText::new(field.label()).small().strong());
                for r in &matrix.values[i] {
                    let text = r.map(|v| format!("{v:.2}")).unwrap_or_else(|| "–".to_string());
                    ui.label(
                        RichText::new(format!(" {text} "))
                            .monospace()
                            .color(diverging_text(*r))
                            .background_color(diverging(*r)),
                    );
                }
                ui.end_row();
            }
        });
}
