use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::{FilterCriteria, FilterField, ALL};
use crate::data::model::{CategoricalField, NumericField};
use crate::report::ReportOptions;

/// Dataset file looked up when neither `--data` nor `SLEEP_DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "Sleep_health_and_lifestyle_dataset.csv";

/// Sleep health & lifestyle analysis dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sleep-health-dashboard",
    about = "Sleep health & lifestyle analysis dashboard",
    version
)]
pub struct Args {
    /// Survey dataset (.csv or .parquet)
    #[arg(long, env = "SLEEP_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Age group filter, e.g. "30-39"
    #[arg(long, default_value = ALL)]
    pub age_group: String,

    /// Occupation filter
    #[arg(long, default_value = ALL)]
    pub occupation: String,

    /// Sleep disorder status filter, e.g. "Insomnia" or "No Disorder"
    #[arg(long, default_value = ALL)]
    pub disorder: String,

    /// Print a JSON summary of the filtered records and exit
    #[arg(long)]
    pub summary: bool,

    /// Numeric field the summary ranks correlations against
    #[arg(long, value_name = "FIELD", default_value = "Sleep Duration")]
    pub correlate_with: NumericField,

    /// Category the summary groups sleep means by
    #[arg(long, value_name = "FIELD", default_value = "Occupation")]
    pub group_by: CategoricalField,

    /// Write the filtered records as CSV to this path and exit
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Args {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::default()
            .with(FilterField::AgeGroup, &self.age_group)
            .with(FilterField::Occupation, &self.occupation)
            .with(FilterField::DisorderStatus, &self.disorder)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            correlate_with: self.correlate_with,
            group_by: self.group_by,
        }
    }

    /// Run without opening a window.
    pub fn is_headless(&self) -> bool {
        self.summary || self.export.is_some()
    }
}
