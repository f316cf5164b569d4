//! Calorie and macro goal calculation
//!
//! Recommended daily targets follow the Mifflin-St Jeor equation:
//!
//! 1. BMR = 10 × weight(kg) + 6.25 × height(cm) − 5 × age + sex offset
//!    (+5 for male, −161 otherwise)
//! 2. TDEE = BMR × activity multiplier
//! 3. Goal adjustment of ±(rate × 7700 kcal/kg) / 7 per day
//! 4. Calories rounded and clamped to [1000, 6500]
//! 5. Macros split 30/45/25 (protein/carbs/fat) at 4/4/9 kcal per gram
//!
//! The calculator does not validate its inputs. Callers run biometrics
//! through [`crate::validation`] first; the calculator only clamps its output.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::models::{BiometricProfile, CalorieGoals, GoalIntent, GoalType, RoundedGoals, Sex};

/// Energy density of protein (kcal/g)
pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
/// Energy density of carbohydrate (kcal/g)
pub const CARBS_KCAL_PER_GRAM: f64 = 4.0;
/// Energy density of fat (kcal/g)
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Tunable calculator parameters. Defaults reproduce the standard targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Lowest daily calorie target ever recommended
    pub min_calories: u32,

    /// Highest daily calorie target ever recommended
    pub max_calories: u32,

    /// Share of calories from protein
    pub protein_ratio: f64,

    /// Share of calories from carbohydrate
    pub carbs_ratio: f64,

    /// Share of calories from fat
    pub fat_ratio: f64,

    /// Energy equivalent of one kilogram of body mass
    pub calories_per_kg: f64,

    /// Step used by the increase/decrease adjustment controls
    pub adjustment_step: u32,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            min_calories: 1000,
            max_calories: 6500,
            protein_ratio: 0.30,
            carbs_ratio: 0.45,
            fat_ratio: 0.25,
            calories_per_kg: 7700.0,
            adjustment_step: 100,
        }
    }
}

impl CalculatorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_calories == 0 || self.min_calories >= self.max_calories {
            return Err(ConfigError::InvalidSetting {
                setting: "min_calories/max_calories".to_string(),
                reason: format!(
                    "expected 0 < min < max, got {}..{}",
                    self.min_calories, self.max_calories
                ),
            });
        }

        let ratios = [
            ("protein_ratio", self.protein_ratio),
            ("carbs_ratio", self.carbs_ratio),
            ("fat_ratio", self.fat_ratio),
        ];
        for (name, ratio) in ratios {
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::InvalidSetting {
                    setting: name.to_string(),
                    reason: format!("must be between 0 and 1, got {}", ratio),
                });
            }
        }

        let total = self.protein_ratio + self.carbs_ratio + self.fat_ratio;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ConfigError::InvalidSetting {
                setting: "macro split".to_string(),
                reason: format!("ratios must sum to 1.0, got {}", total),
            });
        }

        if !self.calories_per_kg.is_finite() || self.calories_per_kg <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                setting: "calories_per_kg".to_string(),
                reason: format!("must be positive, got {}", self.calories_per_kg),
            });
        }

        if self.adjustment_step == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "adjustment_step".to_string(),
                reason: "must be at least 1 kcal".to_string(),
            });
        }

        Ok(())
    }
}

/// Intermediate values behind a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub bmr: f64,
    pub tdee: f64,

    /// Daily surplus (+) or deficit (−) applied for the goal
    pub daily_delta: f64,

    /// TDEE plus the daily delta, before rounding and clamping
    pub adjusted_calories: f64,

    /// True when the clamp changed the rounded calorie value
    pub clamped: bool,

    pub goals: CalorieGoals,
}

/// Stateless goal calculator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalCalculator {
    settings: CalculatorSettings,
}

impl GoalCalculator {
    /// Calculator with the standard settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with custom settings, rejected if inconsistent
    pub fn with_settings(settings: CalculatorSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Basal metabolic rate (Mifflin-St Jeor).
    ///
    /// `Sex::Other` uses the female offset.
    pub fn calculate_bmr(profile: &BiometricProfile) -> f64 {
        let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64;
        match profile.sex {
            Sex::Male => base + 5.0,
            Sex::Female | Sex::Other => base - 161.0,
        }
    }

    /// Total daily energy expenditure
    pub fn calculate_tdee(bmr: f64, profile: &BiometricProfile) -> f64 {
        bmr * profile.activity_level.multiplier()
    }

    /// Signed daily calorie change for a goal. Zero for `Maintain`.
    pub fn daily_delta(&self, intent: &GoalIntent) -> f64 {
        let magnitude = intent.weight_change_rate_kg * self.settings.calories_per_kg / 7.0;
        match intent.goal_type {
            GoalType::Maintain => 0.0,
            GoalType::Lose => -magnitude,
            GoalType::Gain => magnitude,
        }
    }

    pub fn adjust_for_goal(&self, tdee: f64, intent: &GoalIntent) -> f64 {
        match intent.goal_type {
            GoalType::Maintain => tdee,
            _ => tdee + self.daily_delta(intent),
        }
    }

    /// Clamp a whole-kcal value into the configured range
    pub fn clamp_calories(&self, calories: i64) -> u32 {
        calories.clamp(
            self.settings.min_calories as i64,
            self.settings.max_calories as i64,
        ) as u32
    }

    /// Derive the macro split for a calorie target
    pub fn macros_for(&self, calories: u32) -> CalorieGoals {
        let kcal = calories as f64;
        CalorieGoals {
            calories,
            protein_grams: kcal * self.settings.protein_ratio / PROTEIN_KCAL_PER_GRAM,
            carbs_grams: kcal * self.settings.carbs_ratio / CARBS_KCAL_PER_GRAM,
            fat_grams: kcal * self.settings.fat_ratio / FAT_KCAL_PER_GRAM,
        }
    }

    /// Full recommendation with intermediate values
    pub fn breakdown(&self, profile: &BiometricProfile, intent: &GoalIntent) -> GoalBreakdown {
        let bmr = Self::calculate_bmr(profile);
        let tdee = Self::calculate_tdee(bmr, profile);
        let adjusted_calories = self.adjust_for_goal(tdee, intent);

        let rounded = adjusted_calories.round() as i64;
        let calories = self.clamp_calories(rounded);
        let clamped = calories as i64 != rounded;
        if clamped {
            warn!(
                adjusted_calories,
                calories, "Recommended calories clamped to configured range"
            );
        }

        debug!(
            bmr,
            tdee,
            adjusted_calories,
            calories,
            goal = ?intent.goal_type,
            "Calculated calorie goal"
        );

        GoalBreakdown {
            bmr,
            tdee,
            daily_delta: adjusted_calories - tdee,
            adjusted_calories,
            clamped,
            goals: self.macros_for(calories),
        }
    }

    /// Recommended daily goals for a profile and intent
    pub fn calculate(&self, profile: &BiometricProfile, intent: &GoalIntent) -> CalorieGoals {
        self.breakdown(profile, intent).goals
    }

    /// Shift a calorie target by `delta_kcal`, clamp, and re-derive macros
    pub fn adjust_calories(&self, current: u32, delta_kcal: i32) -> CalorieGoals {
        let calories = self.clamp_calories(current as i64 + delta_kcal as i64);
        self.macros_for(calories)
    }
}

/// Recommended goals plus the user's manual override of them.
///
/// Owned by whichever flow is reviewing goals (onboarding summary, goal
/// editing). Holds the inputs so the recommendation can be restored.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSession {
    calculator: GoalCalculator,
    profile: BiometricProfile,
    intent: GoalIntent,
    recommended: CalorieGoals,
    active: CalorieGoals,
}

impl GoalSession {
    pub fn new(calculator: GoalCalculator, profile: BiometricProfile, intent: GoalIntent) -> Self {
        let recommended = calculator.calculate(&profile, &intent);
        Self {
            calculator,
            profile,
            intent,
            active: recommended.clone(),
            recommended,
        }
    }

    /// Resume a session whose active target was previously overridden
    pub fn restore(
        calculator: GoalCalculator,
        profile: BiometricProfile,
        intent: GoalIntent,
        active_calories: u32,
    ) -> Self {
        let mut session = Self::new(calculator, profile, intent);
        let calories = session.calculator.clamp_calories(active_calories as i64);
        session.active = session.calculator.macros_for(calories);
        session
    }

    pub fn profile(&self) -> &BiometricProfile {
        &self.profile
    }

    pub fn intent(&self) -> &GoalIntent {
        &self.intent
    }

    pub fn recommended(&self) -> &CalorieGoals {
        &self.recommended
    }

    pub fn active(&self) -> &CalorieGoals {
        &self.active
    }

    /// Whole-gram version of the active goals
    pub fn rounded(&self) -> RoundedGoals {
        self.active.rounded()
    }

    /// Apply a manual calorie change. Returns false when the clamp leaves
    /// the target unchanged.
    pub fn adjust_calories(&mut self, delta_kcal: i32) -> bool {
        let next = self
            .calculator
            .adjust_calories(self.active.calories, delta_kcal);
        if next.calories == self.active.calories {
            return false;
        }
        debug!(
            from = self.active.calories,
            to = next.calories,
            "Adjusted calorie goal"
        );
        self.active = next;
        true
    }

    pub fn increase(&mut self) -> bool {
        let step = self.calculator.settings().adjustment_step as i32;
        self.adjust_calories(step)
    }

    pub fn decrease(&mut self) -> bool {
        let step = self.calculator.settings().adjustment_step as i32;
        self.adjust_calories(-step)
    }

    /// Discard any override and recompute from the stored inputs
    pub fn reset_to_recommended(&mut self) {
        self.recommended = self.calculator.calculate(&self.profile, &self.intent);
        self.active = self.recommended.clone();
        info!(calories = self.active.calories, "Reset calorie goal to recommended");
    }

    /// Whether the active target diverges from the recommendation
    pub fn is_customized(&self) -> bool {
        self.active.calories != self.recommended.calories
    }

    /// Replace the inputs (e.g. after a profile edit). A customized target is
    /// kept; an untouched one follows the new recommendation.
    pub fn update_inputs(&mut self, profile: BiometricProfile, intent: GoalIntent) {
        let customized = self.is_customized();
        self.profile = profile;
        self.intent = intent;
        self.recommended = self.calculator.calculate(&self.profile, &self.intent);
        if !customized {
            self.active = self.recommended.clone();
        }
    }
}
