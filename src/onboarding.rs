//! Onboarding wizard state
//!
//! A linear five-step flow collecting biometrics, activity, goal, a goal
//! review, and account details. The caller owns an [`OnboardingState`] and
//! feeds it [`OnboardingAction`]s; there is no shared global state.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::goals::{GoalCalculator, GoalSession};
use crate::models::{
    ActivityLevel, BiometricProfile, CalorieGoals, GoalIntent, GoalType, Sex, UnitSystem,
};
use crate::units::WeightChangeRate;
use crate::validation::{validate_intent, validate_profile};

/// Goals shown before any calculation has run
pub const DEFAULT_CALORIE_GOAL: u32 = 2300;
pub const DEFAULT_PROTEIN_GOAL: u32 = 150;
pub const DEFAULT_CARBS_GOAL: u32 = 250;
pub const DEFAULT_FAT_GOAL: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OnboardingStep {
    BasicInfo = 1,
    Activity = 2,
    Goal = 3,
    Summary = 4,
    Account = 5,
}

impl OnboardingStep {
    pub const TOTAL: u8 = 5;

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Self {
        match self {
            OnboardingStep::BasicInfo => OnboardingStep::Activity,
            OnboardingStep::Activity => OnboardingStep::Goal,
            OnboardingStep::Goal => OnboardingStep::Summary,
            OnboardingStep::Summary | OnboardingStep::Account => OnboardingStep::Account,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            OnboardingStep::BasicInfo | OnboardingStep::Activity => OnboardingStep::BasicInfo,
            OnboardingStep::Goal => OnboardingStep::Activity,
            OnboardingStep::Summary => OnboardingStep::Goal,
            OnboardingStep::Account => OnboardingStep::Summary,
        }
    }

    /// Completion fraction for a progress bar
    pub fn progress(&self) -> f64 {
        self.number() as f64 / Self::TOTAL as f64
    }
}

/// Everything collected by the wizard. Measurements are metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingData {
    pub unit_system: UnitSystem,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,
    pub weight_change_rate_kg: f64,
    pub display_name: String,
    pub email: String,

    /// Placeholder until `goals_set` is true
    pub calorie_goal: u32,
    pub protein_goal: u32,
    pub carbs_goal: u32,
    pub fat_goal: u32,

    /// Whether the goals were calculated or entered rather than left at the
    /// placeholder defaults
    #[serde(default)]
    pub goals_set: bool,
}

impl OnboardingData {
    /// Initial values; the default birthdate is 25 years before `today`
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            unit_system: UnitSystem::Metric,
            birthdate: today.checked_sub_months(Months::new(25 * 12)).unwrap_or(today),
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 70.0,
            activity_level: ActivityLevel::ModeratelyActive,
            goal_type: GoalType::Maintain,
            weight_change_rate_kg: 0.0,
            display_name: String::new(),
            email: String::new(),
            calorie_goal: DEFAULT_CALORIE_GOAL,
            protein_goal: DEFAULT_PROTEIN_GOAL,
            carbs_goal: DEFAULT_CARBS_GOAL,
            fat_goal: DEFAULT_FAT_GOAL,
            goals_set: false,
        }
    }
}

/// State transitions of the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingAction {
    SetUnitSystem(UnitSystem),
    SetBirthdate(NaiveDate),
    SetSex(Sex),
    SetHeight(f64),
    SetWeight(f64),
    SetActivityLevel(ActivityLevel),
    SetGoalType(GoalType),
    SetWeightChangeRate(f64),
    SetDisplayName(String),
    SetEmail(String),
    SetCalorieGoal(u32),
    SetProteinGoal(u32),
    SetCarbsGoal(u32),
    SetFatGoal(u32),
    NextStep,
    PreviousStep,
    GotoStep(OnboardingStep),
    Complete,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingState {
    pub current_step: OnboardingStep,
    pub data: OnboardingData,
    pub is_complete: bool,

    /// Date used for age derivation and for `Reset`
    today: NaiveDate,
}

impl OnboardingState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_step: OnboardingStep::BasicInfo,
            data: OnboardingData::initial(today),
            is_complete: false,
            today,
        }
    }

    pub fn apply(&mut self, action: OnboardingAction) {
        debug!(?action, step = ?self.current_step, "Onboarding action");
        let data = &mut self.data;
        match action {
            OnboardingAction::SetUnitSystem(system) => data.unit_system = system,
            OnboardingAction::SetBirthdate(date) => data.birthdate = date,
            OnboardingAction::SetSex(sex) => data.sex = sex,
            OnboardingAction::SetHeight(cm) => data.height_cm = cm,
            OnboardingAction::SetWeight(kg) => data.weight_kg = kg,
            OnboardingAction::SetActivityLevel(level) => data.activity_level = level,
            OnboardingAction::SetGoalType(goal_type) => {
                data.goal_type = goal_type;
                if goal_type == GoalType::Maintain {
                    data.weight_change_rate_kg = 0.0;
                } else if data.weight_change_rate_kg == 0.0 {
                    data.weight_change_rate_kg = WeightChangeRate::default_rate_kg(data.unit_system);
                }
            }
            OnboardingAction::SetWeightChangeRate(kg) => data.weight_change_rate_kg = kg,
            OnboardingAction::SetDisplayName(name) => data.display_name = name,
            OnboardingAction::SetEmail(email) => data.email = email,
            OnboardingAction::SetCalorieGoal(kcal) => {
                data.calorie_goal = kcal;
                data.goals_set = true;
            }
            OnboardingAction::SetProteinGoal(g) => data.protein_goal = g,
            OnboardingAction::SetCarbsGoal(g) => data.carbs_goal = g,
            OnboardingAction::SetFatGoal(g) => data.fat_goal = g,
            OnboardingAction::NextStep => self.current_step = self.current_step.next(),
            OnboardingAction::PreviousStep => self.current_step = self.current_step.previous(),
            OnboardingAction::GotoStep(step) => self.current_step = step,
            OnboardingAction::Complete => self.is_complete = true,
            OnboardingAction::Reset => *self = Self::new(self.today),
        }
    }

    pub fn age(&self) -> u32 {
        crate::models::calculate_age(self.data.birthdate, self.today)
    }

    /// Calculator inputs from the collected data, validated
    pub fn profile(&self) -> Result<BiometricProfile, ValidationError> {
        let profile = BiometricProfile::from_birthdate(
            self.data.weight_kg,
            self.data.height_cm,
            self.data.birthdate,
            self.today,
            self.data.sex,
            self.data.activity_level,
        );
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn intent(&self) -> Result<GoalIntent, ValidationError> {
        let intent = GoalIntent {
            goal_type: self.data.goal_type,
            weight_change_rate_kg: self.data.weight_change_rate_kg,
        };
        validate_intent(&intent)?;
        Ok(intent)
    }

    /// Store calories and whole-gram macros
    pub fn apply_goals(&mut self, goals: &CalorieGoals) {
        let rounded = goals.rounded();
        self.apply(OnboardingAction::SetCalorieGoal(rounded.calories));
        self.apply(OnboardingAction::SetProteinGoal(rounded.protein));
        self.apply(OnboardingAction::SetCarbsGoal(rounded.carbs));
        self.apply(OnboardingAction::SetFatGoal(rounded.fat));
    }

    /// Open a goal review session for the summary step.
    ///
    /// Placeholder goals are replaced by the recommendation; goals already
    /// calculated or entered are restored as the active target.
    pub fn goal_session(&mut self, calculator: GoalCalculator) -> Result<GoalSession, ValidationError> {
        let profile = self.profile()?;
        let intent = self.intent()?;
        let session = if !self.data.goals_set {
            let session = GoalSession::new(calculator, profile, intent);
            self.apply_goals(session.active());
            session
        } else {
            GoalSession::restore(calculator, profile, intent, self.data.calorie_goal)
        };
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = OnboardingState::new(today());
        assert_eq!(state.current_step, OnboardingStep::BasicInfo);
        assert_eq!(state.age(), 25);
        assert_eq!(state.data.calorie_goal, DEFAULT_CALORIE_GOAL);
        assert!(!state.is_complete);
    }

    #[test]
    fn test_step_navigation_saturates() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::PreviousStep);
        assert_eq!(state.current_step, OnboardingStep::BasicInfo);

        for _ in 0..10 {
            state.apply(OnboardingAction::NextStep);
        }
        assert_eq!(state.current_step, OnboardingStep::Account);
        assert_eq!(state.current_step.progress(), 1.0);

        state.apply(OnboardingAction::GotoStep(OnboardingStep::Goal));
        state.apply(OnboardingAction::PreviousStep);
        assert_eq!(state.current_step, OnboardingStep::Activity);
    }

    #[test]
    fn test_goal_type_resets_rate() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetGoalType(GoalType::Lose));
        assert_eq!(state.data.weight_change_rate_kg, 0.5);

        state.apply(OnboardingAction::SetWeightChangeRate(0.75));
        state.apply(OnboardingAction::SetGoalType(GoalType::Gain));
        assert_eq!(state.data.weight_change_rate_kg, 0.75);

        state.apply(OnboardingAction::SetGoalType(GoalType::Maintain));
        assert_eq!(state.data.weight_change_rate_kg, 0.0);
    }

    #[test]
    fn test_imperial_default_rate() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetUnitSystem(UnitSystem::Imperial));
        state.apply(OnboardingAction::SetGoalType(GoalType::Lose));
        assert!((state.data.weight_change_rate_kg - 0.453592).abs() < 1e-5);
    }

    #[test]
    fn test_reset() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetDisplayName("Sam".to_string()));
        state.apply(OnboardingAction::NextStep);
        state.apply(OnboardingAction::Complete);
        state.apply(OnboardingAction::Reset);
        assert_eq!(state, OnboardingState::new(today()));
    }

    #[test]
    fn test_goal_session_seeds_unset_goal() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetBirthdate(
            NaiveDate::from_ymd_opt(1994, 1, 1).unwrap(),
        ));
        assert!(!state.data.goals_set);

        let session = state.goal_session(GoalCalculator::new()).unwrap();
        assert_eq!(session.active().calories, 2556);
        assert!(!session.is_customized());
        assert!(state.data.goals_set);
        assert_eq!(state.data.calorie_goal, 2556);
        assert_eq!(state.data.protein_goal, 192);
        assert_eq!(state.data.carbs_goal, 288);
        assert_eq!(state.data.fat_goal, 71);
    }

    #[test]
    fn test_summary_shows_recommendation_after_walkthrough() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetBirthdate(
            NaiveDate::from_ymd_opt(1994, 1, 1).unwrap(),
        ));
        for _ in 0..3 {
            state.apply(OnboardingAction::NextStep);
        }
        assert_eq!(state.current_step, OnboardingStep::Summary);

        let session = state.goal_session(GoalCalculator::new()).unwrap();
        assert_eq!(session.active(), session.recommended());
        assert_eq!(session.active().calories, 2556);

        // Revisiting the summary keeps the stored goal
        let again = state.goal_session(GoalCalculator::new()).unwrap();
        assert!(!again.is_customized());
    }

    #[test]
    fn test_goal_session_restores_override() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetCalorieGoal(2000));
        let session = state.goal_session(GoalCalculator::new()).unwrap();
        assert_eq!(session.active().calories, 2000);
        assert!(session.is_customized());
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut state = OnboardingState::new(today());
        state.apply(OnboardingAction::SetBirthdate(
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
        ));
        assert!(matches!(
            state.profile(),
            Err(ValidationError::InvalidAge { age: 9 })
        ));
    }
}
