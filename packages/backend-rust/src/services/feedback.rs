use serde::{Deserialize, Serialize};

use crate::services::validation::{check_range, ValidationError};

pub const HELPFULNESS_MIN: i64 = 1;
pub const HELPFULNESS_MAX: i64 = 5;
pub const PAIN_REDUCTION_MIN: i64 = 0;
pub const PAIN_REDUCTION_MAX: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: String,
    pub recommendation_type: String,
    pub helpfulness_score: i64,
    /// `None` when not reported; `Some(0)` is a reported zero reduction.
    #[serde(default)]
    pub pain_reduction: Option<i64>,
}

pub fn validate_feedback(
    helpfulness_score: i64,
    pain_reduction: Option<i64>,
) -> Result<(), ValidationError> {
    check_range(
        "Helpfulness score",
        helpfulness_score,
        HELPFULNESS_MIN,
        HELPFULNESS_MAX,
    )?;
    if let Some(reduction) = pain_reduction {
        check_range(
            "Pain reduction",
            reduction,
            PAIN_REDUCTION_MIN,
            PAIN_REDUCTION_MAX,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpfulness_bounds() {
        assert!(validate_feedback(1, None).is_ok());
        assert!(validate_feedback(5, None).is_ok());
        assert_eq!(
            validate_feedback(0, None).unwrap_err().to_string(),
            "Helpfulness score must be between 1 and 5"
        );
        assert!(validate_feedback(6, None).is_err());
    }

    #[test]
    fn test_zero_pain_reduction_is_a_value() {
        assert!(validate_feedback(3, Some(0)).is_ok());
        assert!(validate_feedback(3, Some(10)).is_ok());
        assert_eq!(
            validate_feedback(3, Some(11)).unwrap_err().to_string(),
            "Pain reduction must be between 0 and 10"
        );
        assert!(validate_feedback(3, Some(-1)).is_err());
    }
}
