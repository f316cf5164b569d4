//! Daily progress against goals
//!
//! Compares what was eaten, burned and drunk in a day with the active
//! [`CalorieGoals`]. Calorie progress uses net calories (consumed minus
//! burned); remaining calories may go negative when the goal is exceeded.
//! Macro and water remaining amounts stop at zero.

use serde::{Deserialize, Serialize};

use crate::models::CalorieGoals;

/// Daily water target in milliliters
pub const DEFAULT_WATER_GOAL_ML: f64 = 2000.0;

/// Progress at or above this fraction counts as approaching the goal
pub const APPROACHING_THRESHOLD: f64 = 0.8;

/// Fraction of `goal` reached by `value`, clamped to [0, 1].
///
/// A non-positive goal counts as met once anything has been logged.
pub fn progress_fraction(value: f64, goal: f64) -> f64 {
    if !value.is_finite() || !goal.is_finite() {
        return 0.0;
    }
    if goal <= 0.0 {
        return if value > 0.0 { 1.0 } else { 0.0 };
    }
    (value / goal).clamp(0.0, 1.0)
}

/// How far along a goal the day is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressLevel {
    /// Below 80% of the goal
    OnTrack,
    /// 80% or more, not yet at the goal
    Approaching,
    /// Goal reached or exceeded
    OverGoal,
}

impl ProgressLevel {
    pub fn from_fraction(progress: f64) -> Self {
        if progress < APPROACHING_THRESHOLD {
            ProgressLevel::OnTrack
        } else if progress < 1.0 {
            ProgressLevel::Approaching
        } else {
            ProgressLevel::OverGoal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressLevel::OnTrack => "On track",
            ProgressLevel::Approaching => "Approaching goal",
            ProgressLevel::OverGoal => "Over goal",
        }
    }
}

/// Food and exercise logged for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyIntake {
    pub calories_consumed: f64,
    pub calories_burned: f64,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fat_grams: f64,
    pub water_ml: f64,
}

/// Net calorie position for the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieProgress {
    pub consumed: f64,
    pub burned: f64,
    pub goal: u32,

    /// Consumed minus burned
    pub net: f64,

    /// Goal minus net; negative once the goal is exceeded
    pub remaining: f64,

    pub progress: f64,
}

impl CalorieProgress {
    pub fn new(consumed: f64, burned: f64, goal: u32) -> Self {
        let net = consumed - burned;
        Self {
            consumed,
            burned,
            goal,
            net,
            remaining: goal as f64 - net,
            progress: progress_fraction(net, goal as f64),
        }
    }

    pub fn level(&self) -> ProgressLevel {
        ProgressLevel::from_fraction(self.progress)
    }
}

/// Progress towards a target that should be reached but not exceeded
/// (a macro nutrient or water)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProgress {
    pub consumed: f64,
    pub goal: f64,

    /// Goal minus consumed, never below zero
    pub remaining: f64,

    pub progress: f64,
}

impl TargetProgress {
    pub fn new(consumed: f64, goal: f64) -> Self {
        Self {
            consumed,
            goal,
            remaining: (goal - consumed).max(0.0),
            progress: progress_fraction(consumed, goal),
        }
    }
}

/// Everything shown on the daily summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub calories: CalorieProgress,
    pub protein: TargetProgress,
    pub carbs: TargetProgress,
    pub fat: TargetProgress,
    pub water: TargetProgress,
}

impl DailyProgress {
    /// Progress against whole-gram goals, the form in which goals are stored
    pub fn new(goals: &CalorieGoals, intake: &DailyIntake, water_goal_ml: f64) -> Self {
        let rounded = goals.rounded();
        Self {
            calories: CalorieProgress::new(
                intake.calories_consumed,
                intake.calories_burned,
                rounded.calories,
            ),
            protein: TargetProgress::new(intake.protein_grams, rounded.protein as f64),
            carbs: TargetProgress::new(intake.carbs_grams, rounded.carbs as f64),
            fat: TargetProgress::new(intake.fat_grams, rounded.fat as f64),
            water: TargetProgress::new(intake.water_ml, water_goal_ml),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::GoalCalculator;

    #[test]
    fn test_calorie_progress_with_exercise() {
        let progress = CalorieProgress::new(1800.0, 300.0, 2000);
        assert_eq!(progress.net, 1500.0);
        assert_eq!(progress.remaining, 500.0);
        assert_eq!(progress.progress, 0.75);
        assert_eq!(progress.level(), ProgressLevel::OnTrack);
    }

    #[test]
    fn test_calorie_progress_over_goal() {
        let progress = CalorieProgress::new(2600.0, 100.0, 2000);
        assert_eq!(progress.remaining, -500.0);
        assert_eq!(progress.progress, 1.0);
        assert_eq!(progress.level(), ProgressLevel::OverGoal);

        let close = CalorieProgress::new(1700.0, 0.0, 2000);
        assert_eq!(close.level(), ProgressLevel::Approaching);
    }

    #[test]
    fn test_burned_exceeds_consumed() {
        let progress = CalorieProgress::new(200.0, 500.0, 2000);
        assert_eq!(progress.net, -300.0);
        assert_eq!(progress.remaining, 2300.0);
        assert_eq!(progress.progress, 0.0);
    }

    #[test]
    fn test_target_progress_stops_at_zero() {
        let protein = TargetProgress::new(180.0, 150.0);
        assert_eq!(protein.remaining, 0.0);
        assert_eq!(protein.progress, 1.0);

        let carbs = TargetProgress::new(100.0, 250.0);
        assert_eq!(carbs.remaining, 150.0);
        assert_eq!(carbs.progress, 0.4);
    }

    #[test]
    fn test_zero_goal() {
        assert_eq!(progress_fraction(0.0, 0.0), 0.0);
        assert_eq!(progress_fraction(10.0, 0.0), 1.0);
        assert_eq!(progress_fraction(f64::NAN, 100.0), 0.0);

        let fat = TargetProgress::new(5.0, 0.0);
        assert_eq!(fat.remaining, 0.0);
        assert_eq!(fat.progress, 1.0);
    }

    #[test]
    fn test_daily_progress_uses_rounded_goals() {
        let goals = GoalCalculator::new().macros_for(2556);
        let intake = DailyIntake {
            calories_consumed: 1278.0,
            protein_grams: 96.0,
            carbs_grams: 300.0,
            water_ml: 1500.0,
            ..DailyIntake::default()
        };
        let progress = DailyProgress::new(&goals, &intake, DEFAULT_WATER_GOAL_ML);

        assert_eq!(progress.calories.progress, 0.5);
        assert_eq!(progress.protein.goal, 192.0);
        assert_eq!(progress.protein.progress, 0.5);
        assert_eq!(progress.carbs.remaining, 0.0);
        assert_eq!(progress.fat.remaining, 71.0);
        assert_eq!(progress.water.remaining, 500.0);
        assert_eq!(progress.water.progress, 0.75);
    }
}
