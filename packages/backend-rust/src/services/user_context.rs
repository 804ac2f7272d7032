use chrono::{Datelike, NaiveDate, Utc};
use painpredict_algo::{UserContext, CYCLE_LENGTH};
use sqlx::SqlitePool;

use crate::db::operations::{recent_lifestyle_entries, recent_pain_entries, LifestyleEntry};

/// Pain entries averaged into the historical baseline
pub const PAIN_HISTORY_WINDOW: usize = 30;
/// Lifestyle entries averaged into the sleep/stress/exercise means
pub const LIFESTYLE_WINDOW: usize = 7;

/// Aggregate recent history into a prediction context.
///
/// Both slices are expected newest first; only the leading window of each
/// is used. Empty history falls back to the population defaults.
pub fn summarize(pain_scores: &[i64], lifestyle: &[LifestyleEntry], today: NaiveDate) -> UserContext {
    let defaults = UserContext::default();
    let pain = &pain_scores[..pain_scores.len().min(PAIN_HISTORY_WINDOW)];
    let lifestyle = &lifestyle[..lifestyle.len().min(LIFESTYLE_WINDOW)];

    let (current_cycle_day, days_to_next_period) = estimate_cycle_position(today);

    UserContext {
        historical_avg_pain: mean(pain.iter().map(|&s| s as f64))
            .unwrap_or(defaults.historical_avg_pain),
        current_cycle_day,
        days_to_next_period,
        avg_sleep: mean(lifestyle.iter().map(|e| e.sleep_hours)).unwrap_or(defaults.avg_sleep),
        avg_stress: mean(lifestyle.iter().map(|e| e.stress_level as f64))
            .unwrap_or(defaults.avg_stress),
        avg_exercise: mean(lifestyle.iter().map(|e| e.exercise_minutes as f64))
            .unwrap_or(defaults.avg_exercise),
        data_points: pain.len(),
    }
}

/// Fixed 28-day cycle keyed on the day of month; no cycle tracking yet.
pub fn estimate_cycle_position(today: NaiveDate) -> (i64, i64) {
    let cycle_day = (i64::from(today.day()) % CYCLE_LENGTH) + 1;
    (cycle_day, CYCLE_LENGTH + 1 - cycle_day)
}

pub async fn load_user_context(pool: &SqlitePool, user_id: &str) -> Result<UserContext, sqlx::Error> {
    load_user_context_on(pool, user_id, Utc::now().date_naive()).await
}

pub async fn load_user_context_on(
    pool: &SqlitePool,
    user_id: &str,
    today: NaiveDate,
) -> Result<UserContext, sqlx::Error> {
    let pain = recent_pain_entries(pool, user_id, PAIN_HISTORY_WINDOW as i64).await?;
    let lifestyle = recent_lifestyle_entries(pool, user_id, LIFESTYLE_WINDOW as i64).await?;
    let scores: Vec<i64> = pain.iter().map(|e| e.pain_score).collect();
    Ok(summarize(&scores, &lifestyle, today))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
