use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::cell;
use crate::data::filter::FilteredView;

const ROW_HEIGHT: f32 = 18.0;

/// Striped table of the visible records restricted to `columns`.
pub fn data_table(ui: &mut Ui, view: &FilteredView<'_>, columns: &[String]) {
    if columns.is_empty() {
        ui.label(RichText::new("Select at least one column to display.").italics());
        return;
    }
    let records: Vec<_> = view.records().collect();

    TableBuilder::new(ui)
        .id_salt("filtered_records")
        .striped(true)
        .resizable(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(70.0), columns.len())
        .header(22.0, |mut header| {
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let record = records[row.index()];
                for name in columns {
                    row.col(|ui| {
                        ui.label(cell(record, name));
                    });
                }
            });
        });
}
