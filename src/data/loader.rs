use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::derive::DerivedFeatures;
use super::model::{
    RawRecord, SleepDataset, COL_AGE, COL_DAILY_STEPS, COL_GENDER, COL_HEART_RATE,
    COL_OCCUPATION, COL_PHYSICAL_ACTIVITY, COL_QUALITY_OF_SLEEP, COL_SLEEP_DISORDER,
    COL_SLEEP_DURATION, COL_STRESS_LEVEL, REQUIRED_COLUMNS,
};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the survey dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + one respondent per line (the reference format)
/// * `.parquet` – the same flat columns written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<SleepDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} records from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.columns
    );
    if dataset.is_empty() {
        log::warn!("{} contains a header but no records", path.display());
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

/// Owns the dataset for the whole process.
///
/// The file is read on the first successful [`DatasetCache::load`]; every
/// later call hands out the same `Arc` without touching the file again.  A
/// failed load leaves the cache empty.  There is no invalidation.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    cell: OnceLock<Arc<SleepDataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Arc<SleepDataset>, LoadError> {
        if let Some(dataset) = self.cell.get() {
            log::debug!("Dataset cache hit for {}", self.path.display());
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_file(&self.path)?);
        Ok(Arc::clone(self.cell.get_or_init(|| dataset)))
    }
}

// ---------------------------------------------------------------------------
// Intermediate table: headers + optional text cells
// ---------------------------------------------------------------------------

/// Text cells as read from any source format, `None` for missing values.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Markers read as missing values, matching common dataframe defaults.
const MISSING_MARKERS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "None", "null", "NULL", "<NA>", "#N/A", "-nan",
];

fn normalize_cell(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl RawTable {
    /// Type the cells, apply feature derivation and build the dataset.
    fn into_dataset(self) -> Result<SleepDataset, LoadError> {
        let index_of = |name: &str| self.headers.iter().position(|h| h == name);

        for required in REQUIRED_COLUMNS {
            if index_of(required).is_none() {
                return Err(LoadError::MissingColumn(required.to_string()));
            }
        }

        // Derived columns present in the source are recomputed, never trusted.
        let mut columns = Vec::with_capacity(self.headers.len());
        for header in &self.headers {
            if DerivedFeatures::COLUMNS.contains(&header.as_str()) {
                log::debug!("Ignoring source column '{header}', it is derived at load");
            } else {
                columns.push(header.clone());
            }
        }

        let known: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .chain([COL_GENDER, COL_SLEEP_DISORDER])
            .collect();
        let passthrough_cols: Vec<(usize, &String)> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                !known.contains(&h.as_str()) && !DerivedFeatures::COLUMNS.contains(&h.as_str())
            })
            .collect();

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            let cell = |name: &str| -> Option<&str> {
                index_of(name)
                    .and_then(|i| row.get(i))
                    .and_then(|c| c.as_deref())
            };
            let int = |name: &str| parse_int(cell(name), row_no, name);

            let passthrough: BTreeMap<String, String> = passthrough_cols
                .iter()
                .filter_map(|(i, name)| {
                    let value = row.get(*i)?.as_ref()?;
                    Some(((*name).clone(), value.clone()))
                })
                .collect();

            records.push(RawRecord {
                age: int(COL_AGE)?,
                occupation: cell(COL_OCCUPATION)
                    .map(str::to_string)
                    .ok_or_else(|| invalid(None, row_no, COL_OCCUPATION))?,
                sleep_duration: parse_float(cell(COL_SLEEP_DURATION), row_no, COL_SLEEP_DURATION)?,
                quality_of_sleep: int(COL_QUALITY_OF_SLEEP)?,
                physical_activity_level: int(COL_PHYSICAL_ACTIVITY)?,
                stress_level: int(COL_STRESS_LEVEL)?,
                heart_rate: int(COL_HEART_RATE)?,
                daily_steps: int(COL_DAILY_STEPS)?,
                gender: cell(COL_GENDER).map(str::to_string),
                sleep_disorder: cell(COL_SLEEP_DISORDER).map(str::to_string),
                passthrough,
            });
        }

        Ok(SleepDataset::new(columns, records))
    }
}

fn parse_float(cell: Option<&str>, row: usize, column: &str) -> Result<f64, LoadError> {
    cell.and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| invalid(cell, row, column))
}

/// Integers may also arrive as whole floats (`"7.0"`) from typed sources.
fn parse_int(cell: Option<&str>, row: usize, column: &str) -> Result<i64, LoadError> {
    let s = cell.ok_or_else(|| invalid(cell, row, column))?;
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
        _ => Err(invalid(cell, row, column)),
    }
}

fn invalid(cell: Option<&str>, row: usize, column: &str) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: cell.unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SleepDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    read_csv(file)
}

/// Parse CSV text (header row first) into a dataset.
pub fn read_csv<R: Read>(input: R) -> Result<SleepDataset, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    RawTable { headers, rows }.into_dataset()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same flat column layout as the CSV.
/// Integer, float, string and boolean columns are read directly; anything
/// else (dictionary-encoded categoricals, string views, ...) is cast to text.
fn load_parquet(path: &Path) -> Result<SleepDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(readable_column)
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            let cells = columns.iter().map(|col| extract_cell(col, row)).collect();
            rows.push(cells);
        }
    }

    RawTable { headers, rows }.into_dataset()
}

/// The column itself when [`extract_cell`] reads its type, else a Utf8 cast.
fn readable_column(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => Ok(Arc::clone(col)),
        other => {
            log::debug!("Casting parquet column of type {other:?} to text");
            Ok(cast(col, &DataType::Utf8)?)
        }
    }
}

/// Render a single Arrow cell as text, `None` when null.
fn extract_cell(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    let text = match col.data_type() {
        DataType::Utf8 => any.downcast_ref::<StringArray>()?.value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => any.downcast_ref::<Int32Array>()?.value(row).to_string(),
        DataType::Int64 => any.downcast_ref::<Int64Array>()?.value(row).to_string(),
        DataType::Float32 => any.downcast_ref::<Float32Array>()?.value(row).to_string(),
        DataType::Float64 => any.downcast_ref::<Float64Array>()?.value(row).to_string(),
        DataType::Boolean => any.downcast_ref::<BooleanArray>()?.value(row).to_string(),
        other => {
            log::warn!("Unreadable parquet column type {other:?}, treating as missing");
            return None;
        }
    };
    normalize_cell(&text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::DictionaryArray;
    use arrow::datatypes::{Field, Int32Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::derive::{AgeGroup, NO_DISORDER};

    const SAMPLE: &str = "\
Person ID,Gender,Age,Occupation,Sleep Duration,Quality of Sleep,Physical Activity Level,Stress Level,BMI Category,Blood Pressure,Heart Rate,Daily Steps,Sleep Disorder
1,Male,27,Software Engineer,6.1,6,42,6,Overweight,126/83,77,4200,None
2,Male,28,Doctor,6.2,6,60,8,Normal,125/80,75,10000,
3,Female,29,Nurse,6.5,5,40,7,Normal Weight,132/87,80,4000,Insomnia
4,Female,59,Nurse,8.1,9,75,3,Overweight,140/95,68,7000,Sleep Apnea
";

    #[test]
    fn reads_csv_and_derives_features() {
        let dataset = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.columns.len(), 13);
        assert!(dataset.has_gender());

        let first = &dataset.records[0];
        assert_eq!(first.raw.age, 27);
        assert_eq!(first.raw.occupation, "Software Engineer");
        assert_eq!(first.derived.age_group, AgeGroup::Under30);
        assert_eq!(first.derived.disorder_status, NO_DISORDER);
        assert_eq!(first.raw.passthrough["Blood Pressure"], "126/83");

        assert_eq!(dataset.records[1].derived.disorder_status, NO_DISORDER);
        assert_eq!(dataset.records[2].derived.disorder_status, "Insomnia");
        assert_eq!(dataset.records[3].derived.age_group, AgeGroup::Fifties);
    }

    #[test]
    fn gender_is_optional() {
        let csv = "Age,Occupation,Sleep Duration,Quality of Sleep,Physical Activity Level,Stress Level,Heart Rate,Daily Steps\n\
                   35,Teacher,7.0,7,50,5,70,6000\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        assert!(!dataset.has_gender());
        assert_eq!(dataset.records[0].raw.gender, None);
        assert_eq!(dataset.records[0].derived.disorder_status, NO_DISORDER);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "Age,Occupation\n30,Nurse\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Sleep Duration"));
    }

    #[test]
    fn bad_number_is_reported_with_location() {
        let csv = "Age,Occupation,Sleep Duration,Quality of Sleep,Physical Activity Level,Stress Level,Heart Rate,Daily Steps\n\
                   thirty,Teacher,7.0,7,50,5,70,6000\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidValue { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "Age");
                assert_eq!(value, "thirty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn derived_source_columns_are_recomputed() {
        let csv = "Age,Occupation,Sleep Duration,Quality of Sleep,Physical Activity Level,Stress Level,Heart Rate,Daily Steps,Age Group\n\
                   35,Teacher,7.0,7,50,5,70,6000,60+\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        assert!(!dataset.has_column("Age Group"));
        assert_eq!(dataset.records[0].derived.age_group, AgeGroup::Thirties);
        assert!(dataset.records[0].raw.passthrough.is_empty());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(ref p) if p == &path));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn header_only_file_loads_empty() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", SAMPLE.lines().next().unwrap()).unwrap();
        file.flush().unwrap();

        let dataset = load_file(file.path()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.columns.len(), 13);
    }

    /// Write one record batch to `survey.parquet` inside `dir`.
    fn write_parquet(dir: &Path, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays = columns.into_iter().map(|(_, col)| col).collect();
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let path = dir.join("survey.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    fn survey_columns(occupation: ArrayRef) -> Vec<(&'static str, ArrayRef)> {
        let ints = |values: [i64; 2]| -> ArrayRef { Arc::new(Int64Array::from(values.to_vec())) };
        vec![
            (COL_GENDER, Arc::new(StringArray::from(vec!["Female", "Male"])) as ArrayRef),
            (COL_AGE, ints([29, 35])),
            (COL_OCCUPATION, occupation),
            (COL_SLEEP_DURATION, Arc::new(Float64Array::from(vec![6.0, 7.5])) as ArrayRef),
            (COL_QUALITY_OF_SLEEP, Arc::new(Int32Array::from(vec![5, 8])) as ArrayRef),
            (COL_PHYSICAL_ACTIVITY, ints([30, 75])),
            (COL_STRESS_LEVEL, ints([8, 3])),
            (COL_HEART_RATE, ints([80, 65])),
            (COL_DAILY_STEPS, ints([4000, 9000])),
            (
                COL_SLEEP_DISORDER,
                Arc::new(StringArray::from(vec![None, Some("Insomnia")])) as ArrayRef,
            ),
        ]
    }

    #[test]
    fn reads_parquet_with_dictionary_and_nullable_columns() {
        let occupations: DictionaryArray<Int32Type> = vec!["Nurse", "Doctor"].into_iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let path = write_parquet(dir.path(), survey_columns(Arc::new(occupations)));

        let dataset = load_file(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns.len(), 10);

        let first = &dataset.records[0];
        assert_eq!(first.raw.occupation, "Nurse");
        assert_eq!(first.raw.gender.as_deref(), Some("Female"));
        assert_eq!(first.raw.quality_of_sleep, 5);
        assert_eq!(first.raw.sleep_disorder, None);
        assert_eq!(first.derived.age_group, AgeGroup::Under30);
        assert_eq!(first.derived.disorder_status, NO_DISORDER);
        assert_eq!(first.derived.sleep_efficiency, 75.0);

        let second = &dataset.records[1];
        assert_eq!(second.raw.occupation, "Doctor");
        assert_eq!(second.raw.daily_steps, 9000);
        assert_eq!(second.derived.age_group, AgeGroup::Thirties);
        assert_eq!(second.derived.disorder_status, "Insomnia");
        assert_eq!(second.derived.sleep_efficiency, 93.75);
    }

    #[test]
    fn null_occupation_in_parquet_is_rejected() {
        let occupations: DictionaryArray<Int32Type> =
            vec![Some("Nurse"), None].into_iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let path = write_parquet(dir.path(), survey_columns(Arc::new(occupations)));

        match load_file(&path).unwrap_err() {
            LoadError::InvalidValue { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, COL_OCCUPATION);
                assert_eq!(value, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cache_loads_once_and_shares_the_dataset() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let cache = DatasetCache::new(file.path());
        let first = cache.load().unwrap();

        // Replacing the file must not affect the cached dataset.
        std::fs::write(file.path(), "garbage").unwrap();
        let second = cache.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 4);
    }

    #[test]
    fn cache_does_not_remember_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let cache = DatasetCache::new(&path);
        assert!(matches!(cache.load(), Err(LoadError::FileNotFound(_))));

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(cache.load().unwrap().len(), 4);
    }
}
