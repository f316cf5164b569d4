// Library interface for nutrigoals modules
// This allows integration tests to access the core functionality

pub mod config;
pub mod error;
pub mod export;
pub mod goals;
pub mod logging;
pub mod models;
pub mod onboarding;
pub mod progress;
pub mod units;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use goals::{CalculatorSettings, GoalBreakdown, GoalCalculator, GoalSession};
pub use units::{HeightFormatter, UnitFormatter, WeightChangeRate};
pub use onboarding::{OnboardingAction, OnboardingState, OnboardingStep};
pub use progress::{CalorieProgress, DailyIntake, DailyProgress, TargetProgress};
pub use export::{ExportFormat, GoalReport};
pub use error::{NutriGoalsError, Result, ValidationError};
pub use logging::{LogConfig, LogFormat, LogLevel};
