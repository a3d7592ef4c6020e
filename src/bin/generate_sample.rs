use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic sleep health survey as CSV and Parquet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of respondents.
    #[arg(long, default_value_t = 374)]
    rows: usize,

    /// Directory receiving `sample_sleep_data.{csv,parquet}`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Deterministic SplitMix64 stream, enough for reproducible survey rows.
struct SurveyRng(u64);

impl SurveyRng {
    fn new(seed: u64) -> Self {
        SurveyRng(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal sample via Box-Muller.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.unit().max(f64::MIN_POSITIVE);
        let u2 = self.unit();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Uniform integer in `lo..=hi`.
    fn between(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Typical sleep and stress of an occupation: (name, sleep hours, stress).
const OCCUPATIONS: [(&str, f64, f64); 8] = [
    ("Software Engineer", 6.6, 6.0),
    ("Doctor", 6.9, 6.8),
    ("Nurse", 7.0, 5.5),
    ("Teacher", 6.9, 4.5),
    ("Engineer", 7.9, 3.9),
    ("Lawyer", 7.4, 5.1),
    ("Accountant", 7.1, 4.6),
    ("Salesperson", 6.4, 7.0),
];

const BMI_CATEGORIES: [&str; 3] = ["Normal", "Overweight", "Obese"];

struct Respondent {
    gender: &'static str,
    age: i64,
    occupation: &'static str,
    sleep_duration: f64,
    quality_of_sleep: i64,
    physical_activity: i64,
    stress_level: i64,
    bmi_category: &'static str,
    blood_pressure: String,
    heart_rate: i64,
    daily_steps: i64,
    sleep_disorder: Option<&'static str>,
}

fn respondent(rng: &mut SurveyRng) -> Respondent {
    let &(occupation, base_sleep, base_stress) = rng.choose(&OCCUPATIONS);
    let age = rng.between(27, 59);
    let stress_level = rng.normal(base_stress, 1.2).round().clamp(3.0, 8.0) as i64;
    let sleep_duration = (rng.normal(base_sleep - 0.1 * (stress_level as f64 - 5.0), 0.4) * 10.0)
        .round()
        .clamp(58.0, 85.0)
        / 10.0;
    let quality_of_sleep =
        ((sleep_duration - 5.0) * 2.0 + rng.normal(0.0, 0.6)).round().clamp(4.0, 9.0) as i64;
    let physical_activity = rng.between(30, 90);
    let daily_steps = (physical_activity * 100 + rng.between(-10, 30) * 100).clamp(3000, 10000);
    let bmi_category = *rng.choose(&BMI_CATEGORIES);

    let disorder_roll = rng.unit();
    let sleep_disorder = match bmi_category {
        "Obese" | "Overweight" if disorder_roll < 0.35 => Some("Sleep Apnea"),
        _ if stress_level >= 7 && disorder_roll < 0.6 => Some("Insomnia"),
        _ if disorder_roll < 0.12 => Some("Insomnia"),
        _ => None,
    };

    let systolic = rng.between(115, 140);
    Respondent {
        gender: if rng.unit() < 0.5 { "Male" } else { "Female" },
        age,
        occupation,
        sleep_duration,
        quality_of_sleep,
        physical_activity,
        stress_level,
        bmi_category,
        blood_pressure: format!("{systolic}/{}", systolic - rng.between(35, 45)),
        heart_rate: 60 + stress_level * 2 + rng.between(0, 6),
        daily_steps,
        sleep_disorder,
    }
}

const HEADERS: [&str; 13] = [
    "Person ID",
    "Gender",
    "Age",
    "Occupation",
    "Sleep Duration",
    "Quality of Sleep",
    "Physical Activity Level",
    "Stress Level",
    "BMI Category",
    "Blood Pressure",
    "Heart Rate",
    "Daily Steps",
    "Sleep Disorder",
];

fn write_csv(path: &Path, rows: &[Respondent]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for (i, r) in rows.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            r.gender.to_string(),
            r.age.to_string(),
            r.occupation.to_string(),
            format!("{:.1}", r.sleep_duration),
            r.quality_of_sleep.to_string(),
            r.physical_activity.to_string(),
            r.stress_level.to_string(),
            r.bmi_category.to_string(),
            r.blood_pressure.clone(),
            r.heart_rate.to_string(),
            r.daily_steps.to_string(),
            r.sleep_disorder.unwrap_or("None").to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Respondent]) -> anyhow::Result<()> {
    let ints = |f: fn(&Respondent) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let strings = |f: fn(&Respondent) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(1..=rows.len() as i64)),
        strings(|r| r.gender),
        ints(|r| r.age),
        strings(|r| r.occupation),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.sleep_duration).collect::<Vec<_>>(),
        )),
        ints(|r| r.quality_of_sleep),
        ints(|r| r.physical_activity),
        ints(|r| r.stress_level),
        strings(|r| r.bmi_category),
        strings(|r| r.blood_pressure.as_str()),
        ints(|r| r.heart_rate),
        ints(|r| r.daily_steps),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.sleep_disorder).collect::<Vec<_>>(),
        )),
    ];

    let fields: Vec<Field> = HEADERS
        .iter()
        .zip(&columns)
        .map(|(name, col)| {
            let nullable = *name == "Sleep Disorder";
            Field::new(*name, col.data_type().clone(), nullable)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Generate `rows` respondents and write both files into `out_dir`.
fn generate(rows: usize, seed: u64, out_dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let mut rng = SurveyRng::new(seed);
    let respondents: Vec<Respondent> = (0..rows).map(|_| respondent(&mut rng)).collect();

    let csv_path = out_dir.join("sample_sleep_data.csv");
    write_csv(&csv_path, &respondents)?;
    let parquet_path = out_dir.join("sample_sleep_data.parquet");
    write_parquet(&parquet_path, &respondents)?;

    log::info!("Generated {rows} respondents with seed {seed}");
    Ok((csv_path, parquet_path))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let (csv_path, parquet_path) = generate(args.rows, args.seed, &args.out_dir)?;
    println!(
        "Wrote {} respondents to {} and {}",
        args.rows,
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
