//! Data Sanitization
//!
//! Keeps model inputs finite and inside the ranges the population model was
//! trained on.
//!
//! Functions:
//! - Feature row validation
//! - User context repair (non-finite averages, out-of-range cycle values)

use crate::types::{UserContext, CYCLE_LENGTH, PAIN_MAX, PAIN_MIN};

/// Upper bound accepted for average daily sleep hours
pub const MAX_SLEEP_HOURS: f64 = 24.0;

/// Upper bound accepted for average daily exercise minutes
pub const MAX_EXERCISE_MINUTES: f64 = 1440.0;

/// Returns true if any value is NaN or infinite
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Replace a non-finite value with `fallback`, then clamp to `[min, max]`
pub fn finite_or(value: f64, fallback: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Repair a context so every field is usable as a model feature.
///
/// Non-finite averages fall back to the population defaults; the cycle day
/// is folded into 1..=28 and days-to-period into 0..=28.
pub fn sanitize_context(context: &UserContext) -> UserContext {
    let defaults = UserContext::default();

    let current_cycle_day = (context.current_cycle_day - 1).rem_euclid(CYCLE_LENGTH) + 1;
    let days_to_next_period = if context.days_to_next_period < 0 {
        context.days_to_next_period.rem_euclid(CYCLE_LENGTH)
    } else {
        context.days_to_next_period.min(CYCLE_LENGTH)
    };

    UserContext {
        historical_avg_pain: finite_or(
            context.historical_avg_pain,
            defaults.historical_avg_pain,
            PAIN_MIN,
            PAIN_MAX,
        ),
        current_cycle_day,
        days_to_next_period,
        avg_sleep: finite_or(context.avg_sleep, defaults.avg_sleep, 0.0, MAX_SLEEP_HOURS),
        avg_stress: finite_or(context.avg_stress, defaults.avg_stress, PAIN_MIN, PAIN_MAX),
        avg_exercise: finite_or(
            context.avg_exercise,
            defaults.avg_exercise,
            0.0,
            MAX_EXERCISE_MINUTES,
        ),
        data_points: context.data_points,
    }
}
