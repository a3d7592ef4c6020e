mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod report;
mod state;
mod ui;

use anyhow::Context;
use app::SleepDashboardApp;
use clap::Parser;
use config::Args;
use data::export::write_export;
use data::filter::{filter, FilteredView};
use data::loader::DatasetCache;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let cache = DatasetCache::new(&args.data);

    if args.is_headless() {
        return run_headless(&args, &cache);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let criteria = args.criteria();
    eframe::run_native(
        "Sleep Health & Lifestyle Analysis Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SleepDashboardApp::new(cache, criteria)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start dashboard window: {e}"))
}

/// `--summary` / `--export`: compute over the filtered records and exit.
fn run_headless(args: &Args, cache: &DatasetCache) -> anyhow::Result<()> {
    let dataset = cache
        .load()
        .with_context(|| format!("loading {}", args.data.display()))?;
    let criteria = args.criteria();
    let view = if criteria.is_empty() {
        FilteredView::all(&dataset)
    } else {
        filter(&dataset, &criteria)
    };
    log::info!("{} of {} records match the filters", view.len(), dataset.len());

    if let Some(path) = &args.export {
        let written = write_export(&view, path)?;
        eprintln!("Exported {written} records to {}.", path.display());
    }

    if args.summary {
        let report = report::build_report(&view, &args.data, &args.report_options());
        println!("{}", report.to_json()?);
    }

    Ok(())
}
