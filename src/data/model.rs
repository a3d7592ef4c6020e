use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::derive::DerivedFeatures;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const COL_AGE: &str = "Age";
pub const COL_OCCUPATION: &str = "Occupation";
pub const COL_SLEEP_DURATION: &str = "Sleep Duration";
pub const COL_QUALITY_OF_SLEEP: &str = "Quality of Sleep";
pub const COL_PHYSICAL_ACTIVITY: &str = "Physical Activity Level";
pub const COL_STRESS_LEVEL: &str = "Stress Level";
pub const COL_HEART_RATE: &str = "Heart Rate";
pub const COL_DAILY_STEPS: &str = "Daily Steps";
pub const COL_GENDER: &str = "Gender";
pub const COL_SLEEP_DISORDER: &str = "Sleep Disorder";

// Derived at load, appended after the source columns.
pub const COL_AGE_GROUP: &str = "Age Group";
pub const COL_SLEEP_EFFICIENCY: &str = "Sleep Efficiency";
pub const COL_ACTIVITY_LEVEL: &str = "Activity Level";
pub const COL_SLEEP_QUALITY: &str = "Sleep Quality Category";
pub const COL_STRESS_CATEGORY: &str = "Stress Category";
pub const COL_DISORDER_STATUS: &str = "Sleep Disorder Status";

/// Columns a source file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_AGE,
    COL_OCCUPATION,
    COL_SLEEP_DURATION,
    COL_QUALITY_OF_SLEEP,
    COL_PHYSICAL_ACTIVITY,
    COL_STRESS_LEVEL,
    COL_HEART_RATE,
    COL_DAILY_STEPS,
];

// ---------------------------------------------------------------------------
// Field identifiers
// ---------------------------------------------------------------------------

/// A field name that is not part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    Unknown(String),
}

/// Numeric fields available for statistics and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NumericField {
    Age,
    SleepDuration,
    QualityOfSleep,
    PhysicalActivityLevel,
    StressLevel,
    HeartRate,
    DailySteps,
    SleepEfficiency,
}

impl NumericField {
    /// The fixed set used for the correlation matrix, in display order.
    pub const ALL: [NumericField; 8] = [
        NumericField::Age,
        NumericField::SleepDuration,
        NumericField::QualityOfSleep,
        NumericField::PhysicalActivityLevel,
        NumericField::StressLevel,
        NumericField::HeartRate,
        NumericField::DailySteps,
        NumericField::SleepEfficiency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericField::Age => COL_AGE,
            NumericField::SleepDuration => COL_SLEEP_DURATION,
            NumericField::QualityOfSleep => COL_QUALITY_OF_SLEEP,
            NumericField::PhysicalActivityLevel => COL_PHYSICAL_ACTIVITY,
            NumericField::StressLevel => COL_STRESS_LEVEL,
            NumericField::HeartRate => COL_HEART_RATE,
            NumericField::DailySteps => COL_DAILY_STEPS,
            NumericField::SleepEfficiency => COL_SLEEP_EFFICIENCY,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NumericField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumericField::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FieldError::Unknown(s.to_string()))
    }
}

/// Categorical fields available for grouping, filtering and colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CategoricalField {
    Occupation,
    Gender,
    AgeGroup,
    ActivityLevel,
    SleepQualityCategory,
    StressCategory,
    SleepDisorderStatus,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 7] = [
        CategoricalField::Occupation,
        CategoricalField::Gender,
        CategoricalField::AgeGroup,
        CategoricalField::ActivityLevel,
        CategoricalField::SleepQualityCategory,
        CategoricalField::StressCategory,
        CategoricalField::SleepDisorderStatus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::Occupation => COL_OCCUPATION,
            CategoricalField::Gender => COL_GENDER,
            CategoricalField::AgeGroup => COL_AGE_GROUP,
            CategoricalField::ActivityLevel => COL_ACTIVITY_LEVEL,
            CategoricalField::SleepQualityCategory => COL_SLEEP_QUALITY,
            CategoricalField::StressCategory => COL_STRESS_CATEGORY,
            CategoricalField::SleepDisorderStatus => COL_DISORDER_STATUS,
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CategoricalField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoricalField::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FieldError::Unknown(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SleepRecord – one survey respondent
// ---------------------------------------------------------------------------

/// Typed source values of one row, before derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub age: i64,
    pub occupation: String,
    pub sleep_duration: f64,
    pub quality_of_sleep: i64,
    pub physical_activity_level: i64,
    pub stress_level: i64,
    pub heart_rate: i64,
    pub daily_steps: i64,
    pub gender: Option<String>,
    pub sleep_disorder: Option<String>,
    /// Any other source column, kept as text: column_name → cell.
    pub passthrough: BTreeMap<String, String>,
}

/// A respondent with its derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepRecord {
    pub raw: RawRecord,
    pub derived: DerivedFeatures,
}

impl SleepRecord {
    /// Apply every feature derivation to `raw`.
    pub fn from_raw(raw: RawRecord) -> Self {
        let derived = DerivedFeatures::derive(
            raw.age,
            raw.sleep_duration,
            raw.daily_steps,
            raw.quality_of_sleep,
            raw.stress_level,
            raw.sleep_disorder.as_deref(),
        );
        SleepRecord { raw, derived }
    }

    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Age => self.raw.age as f64,
            NumericField::SleepDuration => self.raw.sleep_duration,
            NumericField::QualityOfSleep => self.raw.quality_of_sleep as f64,
            NumericField::PhysicalActivityLevel => self.raw.physical_activity_level as f64,
            NumericField::StressLevel => self.raw.stress_level as f64,
            NumericField::HeartRate => self.raw.heart_rate as f64,
            NumericField::DailySteps => self.raw.daily_steps as f64,
            NumericField::SleepEfficiency => self.derived.sleep_efficiency,
        }
    }

    /// Category label; `None` only for a missing Gender.
    pub fn category(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::Occupation => Some(&self.raw.occupation),
            CategoricalField::Gender => self.raw.gender.as_deref(),
            CategoricalField::AgeGroup => Some(self.derived.age_group.label()),
            CategoricalField::ActivityLevel => Some(self.derived.activity_level.label()),
            CategoricalField::SleepQualityCategory => Some(self.derived.sleep_quality.label()),
            CategoricalField::StressCategory => Some(self.derived.stress_category.label()),
            CategoricalField::SleepDisorderStatus => Some(&self.derived.disorder_status),
        }
    }

    pub fn has_disorder(&self) -> bool {
        self.derived.disorder_status != super::derive::NO_DISORDER
    }
}

// ---------------------------------------------------------------------------
// SleepDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepDataset {
    /// Source column names, in file order (derived columns excluded).
    pub columns: Vec<String>,
    pub records: Vec<SleepRecord>,
}

impl SleepDataset {
    pub fn new(columns: Vec<String>, raw: Vec<RawRecord>) -> Self {
        SleepDataset {
            columns,
            records: raw.into_iter().map(SleepRecord::from_raw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Whether the source provided a Gender column.
    pub fn has_gender(&self) -> bool {
        self.has_column(COL_GENDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::{AgeGroup, NO_DISORDER};

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("sleep duration".parse(), Ok(NumericField::SleepDuration));
        assert_eq!(" Daily Steps ".parse(), Ok(NumericField::DailySteps));
        assert_eq!("Age Group".parse(), Ok(CategoricalField::AgeGroup));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = "BMI".parse::<NumericField>().unwrap_err();
        assert_eq!(err, FieldError::Unknown("BMI".to_string()));
        assert_eq!(err.to_string(), "Unknown field: BMI");
        assert!("Sleep Duration".parse::<CategoricalField>().is_err());
    }

    #[test]
    fn record_exposes_source_and_derived_values() {
        let record = SleepRecord::from_raw(RawRecord {
            age: 30,
            occupation: "Nurse".into(),
            sleep_duration: 10.0,
            quality_of_sleep: 9,
            daily_steps: 4000,
            stress_level: 2,
            ..RawRecord::default()
        });

        assert_eq!(record.derived.age_group, AgeGroup::Thirties);
        assert_eq!(record.numeric(NumericField::SleepEfficiency), 125.0);
        assert_eq!(record.numeric(NumericField::Age), 30.0);
        assert_eq!(record.category(CategoricalField::Occupation), Some("Nurse"));
        assert_eq!(record.category(CategoricalField::Gender), None);
        assert_eq!(
            record.category(CategoricalField::SleepDisorderStatus),
            Some(NO_DISORDER)
        );
        assert_eq!(
            record.category(CategoricalField::ActivityLevel),
            Some("Low Activity")
        );
        assert!(!record.has_disorder());
    }
}
