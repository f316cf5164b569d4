use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::export::ExportFormat;
use crate::goals::{CalculatorSettings, GoalCalculator, GoalSession};
use crate::logging::LogConfig;
use crate::models::{ActivityLevel, BiometricProfile, GoalIntent, GoalType, Sex, UnitSystem};
use crate::progress::DEFAULT_WATER_GOAL_ML;

type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Goal calculator parameters
    #[serde(default)]
    pub calculator: CalculatorSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,

    /// Saved profile used as defaults by the CLI
    pub profile: Option<ProfileConfig>,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Display units (metric/imperial)
    pub default_units: UnitSystem,

    /// Report format when none is given on the command line
    pub default_format: ExportFormat,

    /// Daily water target (ml) for progress summaries
    #[serde(default = "default_water_goal_ml")]
    pub water_goal_ml: f64,
}

fn default_water_goal_ml() -> f64 {
    DEFAULT_WATER_GOAL_ML
}

/// Stored biometrics and goal, all metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,

    #[serde(default)]
    pub weight_change_rate_kg: f64,

    /// Manually overridden calorie target, if any
    pub calorie_override: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            calculator: CalculatorSettings::default(),
            logging: LogConfig::default(),
            profile: None,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            default_units: UnitSystem::Metric,
            default_format: ExportFormat::Text,
            water_goal_ml: DEFAULT_WATER_GOAL_ML,
        }
    }
}

fn file_error(path: &Path, err: std::io::Error) -> ConfigError {
    ConfigError::File {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl ProfileConfig {
    /// Calculator inputs as of `today`
    pub fn profile(&self, today: NaiveDate) -> BiometricProfile {
        BiometricProfile::from_birthdate(
            self.weight_kg,
            self.height_cm,
            self.birthdate,
            today,
            self.sex,
            self.activity_level,
        )
    }

    pub fn intent(&self) -> GoalIntent {
        match self.goal_type {
            GoalType::Maintain => GoalIntent::maintain(),
            goal_type => GoalIntent {
                goal_type,
                weight_change_rate_kg: self.weight_change_rate_kg,
            },
        }
    }

    /// Session for the saved goals, re-applying any calorie override
    pub fn goal_session(&self, calculator: GoalCalculator, today: NaiveDate) -> GoalSession {
        let profile = self.profile(today);
        let intent = self.intent();
        match self.calorie_override {
            Some(kcal) => GoalSession::restore(calculator, profile, intent, kcal),
            None => GoalSession::new(calculator, profile, intent),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| file_error(path, e))?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Malformed {
            reason: format!("{}: {}", path.display(), e),
        })?;

        config.calculator.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| file_error(parent, e))?;
        }

        let toml_content = toml::to_string_pretty(self).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;

        fs::write(path, toml_content).map_err(|e| file_error(path, e))?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nutrigoals")
            .join("config.toml")
    }

    /// Load configuration from `path` (or the default location), falling back
    /// to defaults when the file is missing or unreadable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                if config_path.exists() {
                    tracing::warn!(
                        path = %config_path.display(),
                        error = %err,
                        "Config file unusable, using defaults"
                    );
                } else {
                    tracing::debug!(path = %config_path.display(), "No config file, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Calculator built from the configured settings
    pub fn calculator(&self) -> Result<GoalCalculator> {
        GoalCalculator::with_settings(self.calculator.clone())
    }

    /// Replace the saved profile
    pub fn set_profile(&mut self, profile: ProfileConfig) {
        self.profile = Some(profile);
        self.metadata.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_profile() -> ProfileConfig {
        ProfileConfig {
            birthdate: NaiveDate::from_ymd_opt(1994, 1, 1).unwrap(),
            sex: Sex::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity_level: ActivityLevel::LightlyActive,
            goal_type: GoalType::Lose,
            weight_change_rate_kg: 0.5,
            calorie_override: None,
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.settings.default_units, deserialized.settings.default_units);
        assert_eq!(config.calculator, deserialized.calculator);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.set_profile(sample_profile());
        original_config.save_to_file(&config_path).unwrap();

        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded_config.profile, Some(sample_profile()));
    }

    #[test]
    fn test_partial_calculator_section() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.save_to_file(&config_path).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();

        // Drop the calculator table and add a single override
        let trimmed: String = content
            .split("[calculator]")
            .next()
            .unwrap()
            .to_string();
        let patched = format!("{}\n[calculator]\nmax_calories = 5000\n", trimmed.trim_end());
        fs::write(&config_path, patched).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.calculator.max_calories, 5000);
        assert_eq!(loaded.calculator.min_calories, 1000);
        assert_eq!(loaded.calculator().unwrap().adjust_calories(4950, 100).calories, 5000);
    }

    #[test]
    fn test_invalid_calculator_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.calculator.fat_ratio = 0.9;
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
        let fallback = AppConfig::load_or_default(Some(&config_path));
        assert_eq!(fallback.calculator, CalculatorSettings::default());
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("absent.toml");

        match AppConfig::load_from_file(&config_path) {
            Err(ConfigError::File { path, .. }) => assert_eq!(path, config_path),
            other => panic!("expected file error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[settings\ndefault_units = ").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(&config_path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn test_save_into_file_path_fails() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut config = AppConfig::default();
        let result = config.save_to_file(blocker.join("config.toml"));
        assert!(matches!(result, Err(ConfigError::File { .. })));
    }

    #[test]
    fn test_saved_profile_session() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut saved = sample_profile();

        let session = saved.goal_session(GoalCalculator::new(), today);
        assert_eq!(session.profile().age, 30);
        assert!(!session.is_customized());

        saved.calorie_override = Some(1500);
        let session = saved.goal_session(GoalCalculator::new(), today);
        assert_eq!(session.active().calories, 1500);
        assert!(session.is_customized());

        saved.goal_type = GoalType::Maintain;
        assert_eq!(saved.intent(), GoalIntent::maintain());
    }

    #[test]
    fn test_water_goal_defaults_when_absent() {
        let settings: AppSettings =
            toml::from_str("default_units = \"imperial\"\ndefault_format = \"json\"").unwrap();
        assert_eq!(settings.water_goal_ml, DEFAULT_WATER_GOAL_ML);
        assert_eq!(settings.default_units, UnitSystem::Imperial);
    }
}
