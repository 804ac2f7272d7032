use painpredict_algo::{PAIN_MAX, PAIN_MIN};

use crate::db::operations::{NewLifestyleEntry, NewPainEntry};
use crate::services::validation::{check_at_least, check_finite_range, check_range, ValidationError};

pub const MAX_SLEEP_HOURS: f64 = 24.0;
pub const MAX_EXERCISE_MINUTES: i64 = 1440;
pub const MAX_STRESS_LEVEL: i64 = 10;
pub const MAX_PRODUCTIVITY_IMPACT: i64 = 10;

pub fn validate_pain_entry(entry: &NewPainEntry) -> Result<(), ValidationError> {
    check_range("Pain score", entry.pain_score, PAIN_MIN as i64, PAIN_MAX as i64)?;
    if let Some(impact) = entry.productivity_impact {
        check_range("Productivity impact", impact, 0, MAX_PRODUCTIVITY_IMPACT)?;
    }
    Ok(())
}

pub fn validate_lifestyle_entry(entry: &NewLifestyleEntry) -> Result<(), ValidationError> {
    check_finite_range("Sleep hours", entry.sleep_hours, 0.0, MAX_SLEEP_HOURS)?;
    check_range("Exercise minutes", entry.exercise_minutes, 0, MAX_EXERCISE_MINUTES)?;
    check_range("Stress level", entry.stress_level, 0, MAX_STRESS_LEVEL)?;
    check_at_least("Hydration liters", entry.hydration_liters, 0.0)?;
    Ok(())
}
