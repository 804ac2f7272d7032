//! Common Types and Constants
//!
//! Shared data structures used by the predictor and the recommender.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Assumed menstrual cycle length in days
pub const CYCLE_LENGTH: i64 = 28;

/// Lower bound of the pain scale
pub const PAIN_MIN: f64 = 0.0;

/// Upper bound of the pain scale
pub const PAIN_MAX: f64 = 10.0;

/// Pain level at which the severity probability crosses 0.5
pub const SEVERITY_CENTER: f64 = 6.5;

/// Half width of the forecast confidence interval
pub const CONFIDENCE_HALF_WIDTH: f64 = 1.2;

/// Number of features consumed by the regression model
pub const FEATURE_DIMENSION: usize = 6;

/// Forecasts at or above this level count as severe
pub const SEVERE_PAIN_THRESHOLD: f64 = 7.0;

/// Forecasts at or below this level count as mild
pub const MILD_PAIN_THRESHOLD: f64 = 3.0;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Context ====================

/// Aggregated per-user summary the predictor works from.
///
/// Built fresh per request from the most recent pain and lifestyle entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub historical_avg_pain: f64,
    /// Day within the current cycle, 1..=28
    pub current_cycle_day: i64,
    pub days_to_next_period: i64,
    pub avg_sleep: f64,
    pub avg_stress: f64,
    pub avg_exercise: f64,
    pub data_points: usize,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            historical_avg_pain: 5.0,
            current_cycle_day: 14,
            days_to_next_period: 14,
            avg_sleep: 7.0,
            avg_stress: 5.0,
            avg_exercise: 30.0,
            data_points: 0,
        }
    }
}

// ==================== Features ====================

/// Model input for a single forecast day
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub cycle_day: i64,
    pub days_to_period: i64,
    pub historical_pain: f64,
    pub sleep: f64,
    pub stress: f64,
    pub exercise: f64,
}

impl FeatureVector {
    /// Features for `offset` days after the context snapshot.
    pub fn for_offset(context: &UserContext, offset: i64) -> Self {
        let cycle_day = (context.current_cycle_day + offset - 1).rem_euclid(CYCLE_LENGTH) + 1;

        let mut days_to_period = context.days_to_next_period - offset;
        if days_to_period < 0 {
            days_to_period = days_to_period.rem_euclid(CYCLE_LENGTH);
        }

        Self {
            cycle_day,
            days_to_period,
            historical_pain: context.historical_avg_pain,
            sleep: context.avg_sleep,
            stress: context.avg_stress,
            exercise: context.avg_exercise,
        }
    }

    /// Column order used by the regression model
    pub fn to_array(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.cycle_day as f64,
            self.days_to_period as f64,
            self.historical_pain,
            self.sleep,
            self.stress,
            self.exercise,
        ]
    }

    pub fn in_period_window(&self) -> bool {
        (1..=7).contains(&self.cycle_day)
    }

    pub fn in_pre_period_window(&self) -> bool {
        (25..=28).contains(&self.cycle_day)
    }
}

// ==================== Forecast ====================

/// One day's pain prediction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub date: NaiveDate,
    pub predicted_pain: f64,
    #[serde(rename = "severe_probability")]
    pub severity_probability: f64,
    pub confidence_interval: (f64, f64),
    pub drivers: Vec<String>,
}

// ==================== Recommender Types ====================

/// Category of a self-care action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Hydration,
    HeatPad,
    Exercise,
    Dietary,
    MindBody,
    Rest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceLevel {
    High,
    Medium,
    Low,
}

/// Safety condition that rules an action out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contraindication {
    SkinSensitivity,
    AcutePain,
}

/// Contraindication flags supplied with a recommendation request.
///
/// Absent flags deserialize as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContraindicationFlags {
    #[serde(default)]
    pub skin_sensitivity: bool,
    #[serde(default)]
    pub acute_pain: bool,
}

impl ContraindicationFlags {
    pub fn is_set(&self, flag: Contraindication) -> bool {
        match flag {
            Contraindication::SkinSensitivity => self.skin_sensitivity,
            Contraindication::AcutePain => self.acute_pain,
        }
    }
}

/// Static catalog entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Action {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub description: &'static str,
    pub evidence_level: EvidenceLevel,
    pub effectiveness: f64,
    pub contraindications: &'static [Contraindication],
}

/// How sure the ranking is about an action for this user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingConfidence {
    Low,
    Medium,
    High,
}

/// Catalog action scored for one request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedAction {
    #[serde(flatten)]
    pub action: Action,
    pub personal_score: f64,
    pub explanation: String,
    pub confidence: RankingConfidence,
}

// ==================== Helpers ====================

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn clamp_pain(value: f64) -> f64 {
    if value.is_nan() {
        return PAIN_MIN;
    }
    value.clamp(PAIN_MIN, PAIN_MAX)
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(cycle_day: i64, days_to_next: i64) -> UserContext {
        UserContext {
            current_cycle_day: cycle_day,
            days_to_next_period: days_to_next,
            ..UserContext::default()
        }
    }

    #[test]
    fn test_cycle_day_wraps_past_cycle_end() {
        let ctx = context(27, 2);
        assert_eq!(FeatureVector::for_offset(&ctx, 0).cycle_day, 27);
        assert_eq!(FeatureVector::for_offset(&ctx, 1).cycle_day, 28);
        assert_eq!(FeatureVector::for_offset(&ctx, 2).cycle_day, 1);
        assert_eq!(FeatureVector::for_offset(&ctx, 30).cycle_day, 1);
    }

    #[test]
    fn test_days_to_period_wraps_when_negative() {
        let ctx = context(27, 2);
        assert_eq!(FeatureVector::for_offset(&ctx, 2).days_to_period, 0);
        assert_eq!(FeatureVector::for_offset(&ctx, 3).days_to_period, 27);
        assert_eq!(FeatureVector::for_offset(&ctx, 5).days_to_period, 25);
    }

    #[test]
    fn test_days_to_period_kept_when_non_negative() {
        let ctx = context(1, 28);
        assert_eq!(FeatureVector::for_offset(&ctx, 0).days_to_period, 28);
    }

    #[test]
    fn test_feature_array_order() {
        let ctx = UserContext {
            historical_avg_pain: 4.5,
            current_cycle_day: 10,
            days_to_next_period: 19,
            avg_sleep: 6.5,
            avg_stress: 3.0,
            avg_exercise: 45.0,
            data_points: 3,
        };
        let features = FeatureVector::for_offset(&ctx, 0).to_array();
        assert_eq!(features, [10.0, 19.0, 4.5, 6.5, 3.0, 45.0]);
    }

    #[test]
    fn test_contraindication_flags_default_false() {
        let flags: ContraindicationFlags = serde_json::from_str("{}").unwrap();
        assert!(!flags.is_set(Contraindication::AcutePain));
        assert!(!flags.is_set(Contraindication::SkinSensitivity));

        let flags: ContraindicationFlags = serde_json::from_str(r#"{"acute_pain": true}"#).unwrap();
        assert!(flags.is_set(Contraindication::AcutePain));
    }

    #[test]
    fn test_round_and_clamp() {
        assert_eq!(round_to(3.14159, 1), 3.1);
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(clamp_pain(-1.0), 0.0);
        assert_eq!(clamp_pain(12.0), 10.0);
        assert_eq!(clamp_pain(f64::NAN), 0.0);
    }

    #[test]
    fn test_sigmoid_centered() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(3.0) > sigmoid(1.0));
    }
}
