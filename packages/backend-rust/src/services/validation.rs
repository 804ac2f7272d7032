#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{label} must be between {min} and {max}")]
    OutOfRange {
        label: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{label} must be at least {min}")]
    BelowMinimum { label: &'static str, min: f64 },
    #[error("{label} must be a finite number")]
    NotFinite { label: &'static str },
    #[error("{label} must not be empty")]
    Blank { label: &'static str },
    #[error("{label} is not a valid date: {value}")]
    InvalidDate { label: &'static str, value: String },
}

pub fn check_range(label: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            label,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(value)
}

pub fn check_finite_range(
    label: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { label });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { label, min, max });
    }
    Ok(value)
}

pub fn check_at_least(label: &'static str, value: f64, min: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { label });
    }
    if value < min {
        return Err(ValidationError::BelowMinimum { label, min });
    }
    Ok(value)
}

pub fn check_not_blank<'a>(label: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { label });
    }
    Ok(trimmed)
}
