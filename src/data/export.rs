use std::path::Path;

use super::derive::DerivedFeatures;
use super::filter::FilteredView;
use super::model::{
    SleepRecord, COL_ACTIVITY_LEVEL, COL_AGE, COL_AGE_GROUP, COL_DAILY_STEPS,
    COL_DISORDER_STATUS, COL_GENDER, COL_HEART_RATE, COL_OCCUPATION, COL_PHYSICAL_ACTIVITY,
    COL_QUALITY_OF_SLEEP, COL_SLEEP_DISORDER, COL_SLEEP_DURATION, COL_SLEEP_EFFICIENCY,
    COL_SLEEP_QUALITY, COL_STRESS_CATEGORY, COL_STRESS_LEVEL,
};
use crate::error::ExportError;

// ---------------------------------------------------------------------------
// CSV export of a filtered view
// ---------------------------------------------------------------------------

/// Serialise the view as CSV text: header first, source columns in source
/// order followed by the derived columns, one record per line, no index.
/// Missing values are written as empty cells.
pub fn export_csv(view: &FilteredView<'_>) -> Result<String, ExportError> {
    let columns: Vec<&str> = view
        .dataset()
        .columns
        .iter()
        .map(String::as_str)
        .chain(DerivedFeatures::COLUMNS)
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in view.records() {
        writer.write_record(columns.iter().map(|c| cell(record, c)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write [`export_csv`] output to `path`.
pub fn write_export(view: &FilteredView<'_>, path: &Path) -> Result<usize, ExportError> {
    let text = export_csv(view)?;
    std::fs::write(path, text).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(view.len())
}

/// Text of one cell, shared by the CSV export and the data table.
pub(crate) fn cell(record: &SleepRecord, column: &str) -> String {
    let raw = &record.raw;
    let derived = &record.derived;
    match column {
        COL_AGE => raw.age.to_string(),
        COL_OCCUPATION => raw.occupation.clone(),
        COL_SLEEP_DURATION => format_float(raw.sleep_duration),
        COL_QUALITY_OF_SLEEP => raw.quality_of_sleep.to_string(),
        COL_PHYSICAL_ACTIVITY => raw.physical_activity_level.to_string(),
        COL_STRESS_LEVEL => raw.stress_level.to_string(),
        COL_HEART_RATE => raw.heart_rate.to_string(),
        COL_DAILY_STEPS => raw.daily_steps.to_string(),
        COL_GENDER => raw.gender.clone().unwrap_or_default(),
        COL_SLEEP_DISORDER => raw.sleep_disorder.clone().unwrap_or_default(),
        COL_AGE_GROUP => derived.age_group.label().to_string(),
        COL_SLEEP_EFFICIENCY => format_float(derived.sleep_efficiency),
        COL_ACTIVITY_LEVEL => derived.activity_level.label().to_string(),
        COL_SLEEP_QUALITY => derived.sleep_quality.label().to_string(),
        COL_STRESS_CATEGORY => derived.stress_category.label().to_string(),
        COL_DISORDER_STATUS => derived.disorder_status.clone(),
        other => raw.passthrough.get(other).cloned().unwrap_or_default(),
    }
}

/// Whole floats keep one decimal (`8.0`), others use the shortest form.
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
