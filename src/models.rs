use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Biological sex as used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

/// Habitual activity level, mapped to a fixed TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    /// All levels, least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    /// Multiplier applied to BMR to estimate total daily energy expenditure
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtremelyActive => 1.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtremelyActive => "Extremely Active",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Exercise 1-3 times/week",
            ActivityLevel::ModeratelyActive => "Exercise 4-5 times/week",
            ActivityLevel::VeryActive => "Daily exercise or intense 3-4 times/week",
            ActivityLevel::ExtremelyActive => "Intense exercise 6-7 times/week",
        }
    }
}

/// Direction of the weight-change goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Lose,
    Maintain,
    Gain,
}

impl GoalType {
    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Lose => "Lose Weight",
            GoalType::Maintain => "Maintain Weight",
            GoalType::Gain => "Gain Weight",
        }
    }
}

/// Display unit preference. Storage and calculation are always metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::Metric
    }
}

impl UnitSystem {
    pub fn is_metric(&self) -> bool {
        matches!(self, UnitSystem::Metric)
    }
}

/// Biometric inputs to the goal calculator (metric units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricProfile {
    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Height in centimeters
    pub height_cm: f64,

    /// Age in whole years
    pub age: u32,

    pub sex: Sex,

    pub activity_level: ActivityLevel,
}

impl BiometricProfile {
    /// Build a profile deriving the age from a birthdate as of `today`
    pub fn from_birthdate(
        weight_kg: f64,
        height_cm: f64,
        birthdate: NaiveDate,
        today: NaiveDate,
        sex: Sex,
        activity_level: ActivityLevel,
    ) -> Self {
        Self {
            weight_kg,
            height_cm,
            age: calculate_age(birthdate, today),
            sex,
            activity_level,
        }
    }
}

/// What the user wants to do with their weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalIntent {
    pub goal_type: GoalType,

    /// Weekly change magnitude in kilograms. Ignored for `Maintain`.
    pub weight_change_rate_kg: f64,
}

impl GoalIntent {
    pub fn maintain() -> Self {
        Self {
            goal_type: GoalType::Maintain,
            weight_change_rate_kg: 0.0,
        }
    }

    pub fn lose(rate_kg_per_week: f64) -> Self {
        Self {
            goal_type: GoalType::Lose,
            weight_change_rate_kg: rate_kg_per_week,
        }
    }

    pub fn gain(rate_kg_per_week: f64) -> Self {
        Self {
            goal_type: GoalType::Gain,
            weight_change_rate_kg: rate_kg_per_week,
        }
    }
}

/// Daily calorie target with its macro split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieGoals {
    /// Daily energy target in kcal
    pub calories: u32,

    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fat_grams: f64,
}

impl CalorieGoals {
    /// Energy implied by the macro grams at 4/4/9 kcal per gram
    pub fn macro_calories(&self) -> f64 {
        self.protein_grams * 4.0 + self.carbs_grams * 4.0 + self.fat_grams * 9.0
    }

    /// Whole-gram macros, as persisted with a user's goal
    pub fn rounded(&self) -> RoundedGoals {
        RoundedGoals {
            calories: self.calories,
            protein: self.protein_grams.round() as u32,
            carbs: self.carbs_grams.round() as u32,
            fat: self.fat_grams.round() as u32,
        }
    }
}

/// Goal values rounded to whole kcal and grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedGoals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Age in whole years on `today`. Birthdates in the future yield 0.
pub fn calculate_age(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Ages accepted for goal setting
pub fn is_valid_age(age: u32) -> bool {
    (13..120).contains(&age)
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" | "light" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" | "moderate" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" | "very" => Ok(ActivityLevel::VeryActive),
            "extremely_active" | "extreme" => Ok(ActivityLevel::ExtremelyActive),
            _ => Err(format!("Invalid activity level: {}", s)),
        }
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lose" | "lose_weight" => Ok(GoalType::Lose),
            "maintain" | "maintain_weight" => Ok(GoalType::Maintain),
            "gain" | "gain_weight" => Ok(GoalType::Gain),
            _ => Err(format!("Invalid goal type: {}", s)),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(format!("Invalid unit system: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_activity_multipliers() {
        let multipliers: Vec<f64> = ActivityLevel::ALL.iter().map(|l| l.multiplier()).collect();
        assert_eq!(multipliers, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
    }

    #[test]
    fn test_calculate_age_before_and_after_birthday() {
        let birthdate = date(1994, 6, 15);
        assert_eq!(calculate_age(birthdate, date(2024, 6, 14)), 29);
        assert_eq!(calculate_age(birthdate, date(2024, 6, 15)), 30);
        assert_eq!(calculate_age(birthdate, date(2024, 12, 1)), 30);
    }

    #[test]
    fn test_calculate_age_future_birthdate() {
        assert_eq!(calculate_age(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_valid_age_bounds() {
        assert!(!is_valid_age(12));
        assert!(is_valid_age(13));
        assert!(is_valid_age(119));
        assert!(!is_valid_age(120));
    }

    #[test]
    fn test_profile_from_birthdate() {
        let profile = BiometricProfile::from_birthdate(
            70.0,
            175.0,
            date(1990, 3, 1),
            date(2020, 2, 28),
            Sex::Female,
            ActivityLevel::Sedentary,
        );
        assert_eq!(profile.age, 29);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(
            "moderately-active".parse::<ActivityLevel>().unwrap(),
            ActivityLevel::ModeratelyActive
        );
        assert_eq!("gain".parse::<GoalType>().unwrap(), GoalType::Gain);
        assert_eq!("imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ActivityLevel::VeryActive).unwrap();
        assert_eq!(json, "\"very_active\"");
        let sex: Sex = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(sex, Sex::Other);
    }

    #[test]
    fn test_rounded_goals() {
        let goals = CalorieGoals {
            calories: 2556,
            protein_grams: 191.7,
            carbs_grams: 287.55,
            fat_grams: 71.0,
        };
        let rounded = goals.rounded();
        assert_eq!(rounded.protein, 192);
        assert_eq!(rounded.carbs, 288);
        assert_eq!(rounded.fat, 71);
    }
}
