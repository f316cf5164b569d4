//! Unified error hierarchy for nutrigoals
//!
//! The calculator and unit conversion layer are total and never return errors.
//! Everything here belongs to the boundaries around them: input validation,
//! configuration, and report export.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all nutrigoals operations
#[derive(Debug, Error)]
pub enum NutriGoalsError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Report export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors raised at the input boundary before values reach the calculator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Numeric value outside its plausible range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value could not be parsed as a number (or is NaN/infinite)
    #[error("{field} is not a valid number")]
    NotANumber { field: String },

    /// Required value missing
    #[error("{field} is required")]
    Required { field: String },

    /// Value parsed but has the wrong shape
    #[error("Invalid {field}: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Age outside the supported range
    #[error("Age must be at least 13 and below 120, got {age}")]
    InvalidAge { age: u32 },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Config file {path}: {reason}")]
    File { path: PathBuf, reason: String },

    /// TOML parse or serialization failure
    #[error("Malformed configuration: {reason}")]
    Malformed { reason: String },

    /// Calculator settings are inconsistent
    #[error("Invalid calculator setting {setting}: {reason}")]
    InvalidSetting { setting: String, reason: String },
}

/// Report export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Serialization failed
    #[error("Serialization failed for {format}: {reason}")]
    Serialization { format: String, reason: String },

    /// IO failure while writing the report
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Serialization {
            format: "csv".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization {
            format: "json".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias for nutrigoals operations
pub type Result<T> = std::result::Result<T, NutriGoalsError>;

impl NutriGoalsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NutriGoalsError::Validation(_) => ErrorSeverity::Warning,
            NutriGoalsError::Configuration(_) | NutriGoalsError::Export(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NutriGoalsError::Validation(ValidationError::OutOfRange {
                field, min, max, ..
            }) => {
                format!("Please enter a {} between {} and {}.", field, min, max)
            }
            NutriGoalsError::Validation(ValidationError::InvalidAge { .. }) => {
                "You must be at least 13 years old to set nutrition goals.".to_string()
            }
            NutriGoalsError::Configuration(ConfigError::File { path, .. }) => {
                format!("Could not access configuration file: {}", path.display())
            }
            NutriGoalsError::Configuration(ConfigError::Malformed { .. }) => {
                "The configuration file is not valid TOML. Fix it or run `nutrigoals config --init` on a new path.".to_string()
            }
            NutriGoalsError::Export(ExportError::UnsupportedFormat(format)) => {
                format!("Unknown output format '{}'. Use text, json or csv.", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The requested operation failed
    Error,
    /// Rejected input the user can correct
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = NutriGoalsError::Validation(ValidationError::InvalidAge { age: 10 });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = NutriGoalsError::Configuration(ConfigError::Malformed {
            reason: "expected `=`".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
        assert!(err.user_message().contains("not valid TOML"));

        let err: NutriGoalsError = ConfigError::File {
            path: PathBuf::from("/tmp/nutrigoals.toml"),
            reason: "permission denied".to_string(),
        }
        .into();
        assert_eq!(
            err.user_message(),
            "Could not access configuration file: /tmp/nutrigoals.toml"
        );
    }

    #[test]
    fn test_user_messages() {
        let err: NutriGoalsError = ValidationError::OutOfRange {
            field: "weight (kg)".to_string(),
            value: 12.0,
            min: 30.0,
            max: 400.0,
        }
        .into();
        assert!(err.user_message().contains("between 30 and 400"));

        let err: NutriGoalsError = ExportError::UnsupportedFormat("pdf".to_string()).into();
        assert!(err.user_message().contains("'pdf'"));
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::Required {
            field: "Calorie goal".to_string(),
        };
        assert_eq!(err.to_string(), "Calorie goal is required");
    }
}
