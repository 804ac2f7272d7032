//! Pain Predictor
//!
//! Turns a user context into a day-by-day pain forecast using the
//! population regression model.
//!
//! For each forecast day the predictor:
//! - shifts the cycle position by the day offset
//! - scores the feature vector with the model and clamps to 0..=10
//! - maps the score to a severity probability (logistic, centered at 6.5)
//! - attaches a ±1.2 confidence band and threshold-based drivers

use chrono::{Days, NaiveDate, Utc};

use crate::model::{load_or_train, ModelError, ModelSource, ModelStore, PainModel};
use crate::sanitize::sanitize_context;
use crate::types::{
    clamp_pain, round_to, sigmoid, FeatureVector, Forecast, UserContext, CONFIDENCE_HALF_WIDTH,
    SEVERITY_CENTER,
};

pub const DRIVER_DURING_PERIOD: &str = "during your period";
pub const DRIVER_APPROACHING_PERIOD: &str = "approaching your period";
pub const DRIVER_LOW_SLEEP: &str = "low sleep quality";
pub const DRIVER_HIGH_STRESS: &str = "high stress levels";
pub const DRIVER_TYPICAL: &str = "typical cycle pattern";

const LOW_SLEEP_HOURS: f64 = 6.0;
const HIGH_STRESS_LEVEL: f64 = 7.0;

/// Read-only forecaster shared by all requests
#[derive(Clone, Debug)]
pub struct Predictor {
    model: PainModel,
}

impl Predictor {
    pub fn new(model: PainModel) -> Self {
        Self { model }
    }

    /// Load the stored model, training and persisting one if none exists.
    pub fn initialize(store: &dyn ModelStore) -> Result<(Self, ModelSource), ModelError> {
        let (model, source) = load_or_train(store)?;
        Ok((Self::new(model), source))
    }

    pub fn model_version(&self) -> &str {
        &self.model.version
    }

    /// Forecasts for `days` consecutive days starting today (UTC).
    ///
    /// The caller bounds `days` to 1..=14; no check happens here.
    pub fn predict_for_user(&self, context: &UserContext, days: u32) -> Vec<Forecast> {
        self.predict_from(context, days, Utc::now().date_naive())
    }

    /// Forecasts for `days` consecutive days starting at `start`.
    pub fn predict_from(&self, context: &UserContext, days: u32, start: NaiveDate) -> Vec<Forecast> {
        let context = sanitize_context(context);

        (0..days)
            .map_while(|offset| {
                let date = start.checked_add_days(Days::new(u64::from(offset)))?;
                let features = FeatureVector::for_offset(&context, i64::from(offset));
                Some(self.forecast(date, &features))
            })
            .collect()
    }

    /// Raw model score for one feature vector, clamped to the pain scale
    pub fn score(&self, features: &FeatureVector) -> f64 {
        clamp_pain(self.model.predict(&features.to_array()))
    }

    fn forecast(&self, date: NaiveDate, features: &FeatureVector) -> Forecast {
        let pain = round_to(self.score(features), 1);

        Forecast {
            date,
            predicted_pain: pain,
            severity_probability: round_to(severity_probability(pain), 3),
            confidence_interval: confidence_interval(pain),
            drivers: drivers(features),
        }
    }
}

pub fn severity_probability(pain: f64) -> f64 {
    sigmoid(pain - SEVERITY_CENTER)
}

/// Symmetric band around `pain`, clamped to the pain scale
pub fn confidence_interval(pain: f64) -> (f64, f64) {
    (
        clamp_pain(round_to(pain - CONFIDENCE_HALF_WIDTH, 1)),
        clamp_pain(round_to(pain + CONFIDENCE_HALF_WIDTH, 1)),
    )
}

/// Human-readable reasons derived from feature thresholds
pub fn drivers(features: &FeatureVector) -> Vec<String> {
    let mut drivers = Vec::new();

    if features.in_period_window() {
        drivers.push(DRIVER_DURING_PERIOD.to_string());
    } else if features.in_pre_period_window() {
        drivers.push(DRIVER_APPROACHING_PERIOD.to_string());
    }

    if features.sleep < LOW_SLEEP_HOURS {
        drivers.push(DRIVER_LOW_SLEEP.to_string());
    }

    if features.stress > HIGH_STRESS_LEVEL {
        drivers.push(DRIVER_HIGH_STRESS.to_string());
    }

    if drivers.is_empty() {
        drivers.push(DRIVER_TYPICAL.to_string());
    }
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryModelStore;
    use std::sync::OnceLock;

    fn predictor() -> &'static Predictor {
        static PREDICTOR: OnceLock<Predictor> = OnceLock::new();
        PREDICTOR.get_or_init(|| {
            let (predictor, _) = Predictor::initialize(&MemoryModelStore::new()).unwrap();
            predictor
        })
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn symptomatic_context() -> UserContext {
        UserContext {
            historical_avg_pain: 5.0,
            current_cycle_day: 3,
            days_to_next_period: 26,
            avg_sleep: 5.0,
            avg_stress: 8.0,
            avg_exercise: 20.0,
            data_points: 10,
        }
    }

    #[test]
    fn test_drivers_for_symptomatic_context() {
        let forecasts = predictor().predict_from(&symptomatic_context(), 1, start());
        assert_eq!(forecasts.len(), 1);
        let drivers = &forecasts[0].drivers;
        assert!(drivers.contains(&DRIVER_DURING_PERIOD.to_string()));
        assert!(drivers.contains(&DRIVER_LOW_SLEEP.to_string()));
        assert!(drivers.contains(&DRIVER_HIGH_STRESS.to_string()));
    }

    #[test]
    fn test_typical_pattern_fallback() {
        let ctx = UserContext {
            current_cycle_day: 14,
            days_to_next_period: 15,
            ..UserContext::default()
        };
        let forecasts = predictor().predict_from(&ctx, 1, start());
        assert_eq!(forecasts[0].drivers, vec![DRIVER_TYPICAL.to_string()]);
    }

    #[test]
    fn test_pre_period_driver() {
        let features = FeatureVector {
            cycle_day: 26,
            days_to_period: 3,
            historical_pain: 5.0,
            sleep: 7.0,
            stress: 5.0,
            exercise: 30.0,
        };
        assert_eq!(drivers(&features), vec![DRIVER_APPROACHING_PERIOD.to_string()]);
    }

    #[test]
    fn test_one_forecast_per_day_in_order() {
        let forecasts = predictor().predict_from(&UserContext::default(), 14, start());
        assert_eq!(forecasts.len(), 14);
        for (offset, pair) in forecasts.windows(2).enumerate() {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap(), "day {}", offset);
        }
        assert_eq!(forecasts[0].date, start());
    }

    #[test]
    fn test_predict_for_user_starts_today() {
        let today = Utc::now().date_naive();
        let forecasts = predictor().predict_for_user(&UserContext::default(), 3);
        assert_eq!(forecasts.len(), 3);
        // Allow for the clock rolling over midnight between the two reads
        assert!(forecasts[0].date == today || forecasts[0].date == today.succ_opt().unwrap());
    }

    #[test]
    fn test_period_days_forecast_higher_than_mid_cycle() {
        let period = UserContext {
            current_cycle_day: 2,
            days_to_next_period: 27,
            ..UserContext::default()
        };
        let mid = UserContext {
            current_cycle_day: 14,
            days_to_next_period: 15,
            ..UserContext::default()
        };
        let period_pain = predictor().predict_from(&period, 1, start())[0].predicted_pain;
        let mid_pain = predictor().predict_from(&mid, 1, start())[0].predicted_pain;
        assert!(period_pain > mid_pain, "{} <= {}", period_pain, mid_pain);
    }

    #[test]
    fn test_interval_and_severity_bounds() {
        for ctx in [UserContext::default(), symptomatic_context()] {
            for forecast in predictor().predict_from(&ctx, 14, start()) {
                let (lo, hi) = forecast.confidence_interval;
                assert!((0.0..=10.0).contains(&forecast.predicted_pain));
                assert!(0.0 <= lo && lo <= forecast.predicted_pain);
                assert!(forecast.predicted_pain <= hi && hi <= 10.0);
                assert!(forecast.severity_probability > 0.0 && forecast.severity_probability < 1.0);
            }
        }
    }

    #[test]
    fn test_confidence_interval_width() {
        let (lo, hi) = confidence_interval(5.0);
        assert!((hi - lo - 2.4).abs() < 1e-9);
        assert_eq!(confidence_interval(0.5), (0.0, 1.7));
        assert_eq!(confidence_interval(9.5), (8.3, 10.0));
    }

    #[test]
    fn test_severity_centered_at_six_and_a_half() {
        assert!((severity_probability(6.5) - 0.5).abs() < 1e-12);
        assert!(severity_probability(8.0) > severity_probability(7.0));
    }
}
