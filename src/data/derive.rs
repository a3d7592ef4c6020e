use std::fmt;

use serde::Serialize;

use super::model::{
    COL_ACTIVITY_LEVEL, COL_AGE_GROUP, COL_DISORDER_STATUS, COL_SLEEP_EFFICIENCY,
    COL_SLEEP_QUALITY, COL_STRESS_CATEGORY,
};

// ---------------------------------------------------------------------------
// Feature derivation: raw survey values → categorical labels
// ---------------------------------------------------------------------------

/// Label used when a respondent has no recorded sleep disorder.
pub const NO_DISORDER: &str = "No Disorder";

/// Nightly hours treated as 100% sleep efficiency.
const REFERENCE_SLEEP_HOURS: f64 = 8.0;

/// Age bracket, by thresholds `<30`, `<40`, `<50`, `<60`, else `60+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    Under30,
    Thirties,
    Forties,
    Fifties,
    SixtyPlus,
}

impl AgeGroup {
    pub fn from_age(age: i64) -> Self {
        if age < 30 {
            AgeGroup::Under30
        } else if age < 40 {
            AgeGroup::Thirties
        } else if age < 50 {
            AgeGroup::Forties
        } else if age < 60 {
            AgeGroup::Fifties
        } else {
            AgeGroup::SixtyPlus
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Under30 => "18-29",
            AgeGroup::Thirties => "30-39",
            AgeGroup::Forties => "40-49",
            AgeGroup::Fifties => "50-59",
            AgeGroup::SixtyPlus => "60+",
        }
    }
}

/// Daily step bracket: `<5000`, `<8000`, else high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn from_steps(steps: i64) -> Self {
        if steps < 5000 {
            ActivityLevel::Low
        } else if steps < 8000 {
            ActivityLevel::Moderate
        } else {
            ActivityLevel::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Low => "Low Activity",
            ActivityLevel::Moderate => "Moderate Activity",
            ActivityLevel::High => "High Activity",
        }
    }
}

/// Bucketed "Quality of Sleep" score (inclusive upper bounds 4 / 6 / 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SleepQuality {
    pub fn from_score(score: i64) -> Self {
        if score <= 4 {
            SleepQuality::Poor
        } else if score <= 6 {
            SleepQuality::Fair
        } else if score <= 8 {
            SleepQuality::Good
        } else {
            SleepQuality::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SleepQuality::Poor => "Poor",
            SleepQuality::Fair => "Fair",
            SleepQuality::Good => "Good",
            SleepQuality::Excellent => "Excellent",
        }
    }
}

/// Bucketed "Stress Level" score (inclusive upper bounds 3 / 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StressCategory {
    Low,
    Medium,
    High,
}

impl StressCategory {
    pub fn from_score(score: i64) -> Self {
        if score <= 3 {
            StressCategory::Low
        } else if score <= 6 {
            StressCategory::Medium
        } else {
            StressCategory::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressCategory::Low => "Low (1-3)",
            StressCategory::Medium => "Medium (4-6)",
            StressCategory::High => "High (7-10)",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(AgeGroup, ActivityLevel, SleepQuality, StressCategory);

/// Sleep duration as a percentage of eight hours. Not clamped.
pub fn sleep_efficiency(duration_hours: f64) -> f64 {
    duration_hours / REFERENCE_SLEEP_HOURS * 100.0
}

/// Normalise a "Sleep Disorder" value: absent or blank becomes [`NO_DISORDER`].
pub fn disorder_status(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => NO_DISORDER.to_string(),
        Some(s) => s.to_string(),
    }
}

/// All derived columns of one record, computed once at load.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    pub age_group: AgeGroup,
    pub sleep_efficiency: f64,
    pub activity_level: ActivityLevel,
    pub sleep_quality: SleepQuality,
    pub stress_category: StressCategory,
    pub disorder_status: String,
}

impl DerivedFeatures {
    /// Names of the derived columns, in export order.
    pub const COLUMNS: [&'static str; 6] = [
        COL_AGE_GROUP,
        COL_SLEEP_EFFICIENCY,
        COL_ACTIVITY_LEVEL,
        COL_SLEEP_QUALITY,
        COL_STRESS_CATEGORY,
        COL_DISORDER_STATUS,
    ];

    pub fn derive(
        age: i64,
        sleep_duration: f64,
        daily_steps: i64,
        quality_of_sleep: i64,
        stress_level: i64,
        sleep_disorder: Option<&str>,
    ) -> Self {
        DerivedFeatures {
            age_group: AgeGroup::from_age(age),
            sleep_efficiency: sleep_efficiency(sleep_duration),
            activity_level: ActivityLevel::from_steps(daily_steps),
            sleep_quality: SleepQuality::from_score(quality_of_sleep),
            stress_category: StressCategory::from_score(stress_level),
            disorder_status: disorder_status(sleep_disorder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_boundaries() {
        assert_eq!(AgeGroup::from_age(29).label(), "18-29");
        assert_eq!(AgeGroup::from_age(30).label(), "30-39");
        assert_eq!(AgeGroup::from_age(39).label(), "30-39");
        assert_eq!(AgeGroup::from_age(40).label(), "40-49");
        assert_eq!(AgeGroup::from_age(49).label(), "40-49");
        assert_eq!(AgeGroup::from_age(50).label(), "50-59");
        assert_eq!(AgeGroup::from_age(59).label(), "50-59");
        assert_eq!(AgeGroup::from_age(60).label(), "60+");
    }

    #[test]
    fn age_group_is_monotonic_and_total() {
        let mut previous = AgeGroup::from_age(-5);
        assert_eq!(previous, AgeGroup::Under30);
        for age in -5..130 {
            let group = AgeGroup::from_age(age);
            assert!(group >= previous, "age {age} went backwards");
            previous = group;
        }
        assert_eq!(previous, AgeGroup::SixtyPlus);
    }

    #[test]
    fn efficiency_is_unclamped() {
        assert_eq!(sleep_efficiency(10.0), 125.0);
        assert_eq!(sleep_efficiency(8.0), 100.0);
        assert_eq!(sleep_efficiency(6.0), 75.0);
        assert_eq!(sleep_efficiency(0.0), 0.0);
    }

    #[test]
    fn activity_boundaries() {
        assert_eq!(ActivityLevel::from_steps(4999), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_steps(5000), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_steps(7999), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_steps(8000), ActivityLevel::High);
    }

    #[test]
    fn quality_boundaries_are_inclusive() {
        assert_eq!(SleepQuality::from_score(4), SleepQuality::Poor);
        assert_eq!(SleepQuality::from_score(5), SleepQuality::Fair);
        assert_eq!(SleepQuality::from_score(6), SleepQuality::Fair);
        assert_eq!(SleepQuality::from_score(8), SleepQuality::Good);
        assert_eq!(SleepQuality::from_score(9), SleepQuality::Excellent);
    }

    #[test]
    fn stress_boundaries_are_inclusive() {
        assert_eq!(StressCategory::from_score(3).label(), "Low (1-3)");
        assert_eq!(StressCategory::from_score(4).label(), "Medium (4-6)");
        assert_eq!(StressCategory::from_score(6).label(), "Medium (4-6)");
        assert_eq!(StressCategory::from_score(7).label(), "High (7-10)");
    }

    #[test]
    fn missing_disorder_becomes_no_disorder() {
        assert_eq!(disorder_status(None), NO_DISORDER);
        assert_eq!(disorder_status(Some("  ")), NO_DISORDER);
        assert_eq!(disorder_status(Some("Sleep Apnea")), "Sleep Apnea");
        assert_eq!(disorder_status(Some("Insomnia")), "Insomnia");
    }
}
