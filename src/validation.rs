//! Input validation boundary
//!
//! Biometrics and manually typed goals are checked here before they reach
//! the calculator or get persisted.

use crate::error::ValidationError;
use crate::models::{is_valid_age, BiometricProfile, GoalIntent};

pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 400.0;

pub const MIN_HEIGHT_CM: f64 = 100.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;

/// Range accepted when a user types a calorie goal by hand
pub const MIN_CALORIE_GOAL: f64 = 1200.0;
pub const MAX_CALORIE_GOAL: f64 = 5000.0;

pub const MIN_MACRO_GOAL: f64 = 0.0;
pub const MAX_MACRO_GOAL: f64 = 1000.0;

/// Edits smaller than this are not treated as a change
pub const GOAL_COMPARISON_THRESHOLD: f64 = 0.01;

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

pub fn validate_profile(profile: &BiometricProfile) -> Result<(), ValidationError> {
    check_range("weight (kg)", profile.weight_kg, MIN_WEIGHT_KG, MAX_WEIGHT_KG)?;
    check_range("height (cm)", profile.height_cm, MIN_HEIGHT_CM, MAX_HEIGHT_CM)?;
    if !is_valid_age(profile.age) {
        return Err(ValidationError::InvalidAge { age: profile.age });
    }
    Ok(())
}

pub fn validate_intent(intent: &GoalIntent) -> Result<(), ValidationError> {
    let rate = intent.weight_change_rate_kg;
    if !rate.is_finite() {
        return Err(ValidationError::NotANumber {
            field: "weight change rate".to_string(),
        });
    }
    if rate < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "weight change rate".to_string(),
            reason: "rate is a magnitude and cannot be negative".to_string(),
        });
    }
    Ok(())
}

fn is_whole_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Digits with at most one decimal place, e.g. `150` or `72.5`
fn is_one_decimal_number(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, fraction)) => {
            is_whole_number(whole) && fraction.len() == 1 && is_whole_number(fraction)
        }
        None => is_whole_number(s),
    }
}

/// Validate a typed calorie goal and return its value
pub fn validate_calorie_input(input: &str) -> Result<u32, ValidationError> {
    let field = "Calorie goal";
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let value: f64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
    })?;

    if !is_whole_number(trimmed) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        });
    }

    check_range(field, value, MIN_CALORIE_GOAL, MAX_CALORIE_GOAL)?;
    Ok(value as u32)
}

/// Validate an optional typed macro goal. Empty input is `Ok(None)`.
pub fn validate_macro_input(input: &str, macro_name: &str) -> Result<Option<f64>, ValidationError> {
    let field = format!("{} goal", macro_name);
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber { field: field.clone() })?;

    if !is_one_decimal_number(trimmed) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a non-negative number with at most 1 decimal".to_string(),
        });
    }

    check_range(&field, value, MIN_MACRO_GOAL, MAX_MACRO_GOAL)?;
    Ok(Some(value))
}

/// Whether a typed goal differs from the stored one.
///
/// Blank input counts as a change only when a value was stored; unparseable
/// input never counts.
pub fn has_goal_changed(new_input: &str, old_value: Option<f64>) -> bool {
    let trimmed = new_input.trim();
    if trimmed.is_empty() {
        return old_value.is_some();
    }

    let value: f64 = match trimmed.parse() {
        Ok(v) if f64::is_finite(v) => v,
        _ => return false,
    };

    match old_value {
        None => true,
        Some(old) => (value - old).abs() > GOAL_COMPARISON_THRESHOLD,
    }
}
