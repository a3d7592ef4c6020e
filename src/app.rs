use eframe::egui::{self, Color32, RichText};

use crate::data::filter::FilterCriteria;
use crate::data::loader::DatasetCache;
use crate::state::{AppState, Tab};
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SleepDashboardApp {
    pub cache: DatasetCache,
    pub state: AppState,
}

impl SleepDashboardApp {
    /// Load the dataset once and set up the initial filters.
    pub fn new(cache: DatasetCache, criteria: FilterCriteria) -> Self {
        let mut state = AppState::new(criteria);
        match cache.load() {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                state.load_error = Some(e.to_string());
            }
        }
        Self { cache, state }
    }
}

impl eframe::App for SleepDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title + counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        if let Some(err) = &self.state.load_error {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "{err}\nPlease make sure '{}' exists.",
                            self.cache.path().display()
                        ))
                        .color(Color32::RED)
                        .heading(),
                    );
                });
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::metrics_row(ui, &self.state);
            ui.separator();
            panels::tab_bar(ui, &mut self.state);
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.tab {
                    Tab::Overview => tabs::overview(ui, &self.state),
                    Tab::Occupation => tabs::occupation(ui, &self.state),
                    Tab::Correlations => tabs::correlations(ui, &mut self.state),
                    Tab::Demographics => tabs::demographics(ui, &self.state),
                    Tab::Explorer => tabs::explorer(ui, &mut self.state),
                });
        });
    }
}
