use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use nutrigoals::config::{AppConfig, ProfileConfig};
use nutrigoals::error::ErrorSeverity;
use nutrigoals::export::{render, render_progress, write_report, ExportFormat, GoalReport};
use nutrigoals::logging::init_logging;
use nutrigoals::progress::{DailyIntake, DailyProgress};
use nutrigoals::units::{from_feet_inches, HeightFormatter, UnitFormatter, WeightChangeRate};
use nutrigoals::validation::{validate_calorie_input, validate_intent, validate_profile};
use nutrigoals::{
    calculate_age, ActivityLevel, BiometricProfile, GoalIntent, GoalSession, GoalType,
    NutriGoalsError, Sex, UnitSystem,
};

/// nutrigoals - Calorie and macro goal calculator
///
/// Estimates daily energy needs with the Mifflin-St Jeor equation and splits
/// them into protein, carbohydrate and fat targets.
#[derive(Parser)]
#[command(name = "nutrigoals")]
#[command(version)]
#[command(about = "Calorie and macro goal calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate recommended calorie and macro goals
    Calculate {
        /// Body weight (kg, or lbs with --units imperial)
        #[arg(short, long)]
        weight: Option<f64>,

        /// Height (cm, or inches with --units imperial)
        #[arg(long)]
        height: Option<f64>,

        /// Height feet, combined with --inches
        #[arg(long, conflicts_with = "height")]
        feet: Option<u32>,

        /// Height inches, combined with --feet
        #[arg(long, requires = "feet")]
        inches: Option<u32>,

        /// Age in years
        #[arg(short, long, conflicts_with = "birthdate")]
        age: Option<u32>,

        /// Birthdate (YYYY-MM-DD)
        #[arg(short, long)]
        birthdate: Option<NaiveDate>,

        /// Sex (male, female, other)
        #[arg(short, long)]
        sex: Option<Sex>,

        /// Activity level (sedentary, lightly-active, moderately-active, very-active, extremely-active)
        #[arg(long)]
        activity: Option<ActivityLevel>,

        /// Goal (lose, maintain, gain)
        #[arg(short, long)]
        goal: Option<GoalType>,

        /// Weekly weight change (kg/week, or lbs/week with --units imperial)
        #[arg(short, long)]
        rate: Option<f64>,

        /// Unit system for inputs and display (metric, imperial)
        #[arg(short, long)]
        units: Option<UnitSystem>,

        /// Manual calorie adjustment in kcal, repeatable (e.g. --adjust=-100)
        #[arg(long, allow_hyphen_values = true)]
        adjust: Vec<i32>,

        /// Ignore any saved calorie override
        #[arg(long)]
        reset: bool,

        /// Include BMR, TDEE and goal adjustment in the report
        #[arg(long)]
        breakdown: bool,

        /// Report format (text, json, csv)
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the profile and any override to the config file
        #[arg(long)]
        save: bool,
    },

    /// Show today's intake against the saved (or given) goals
    Progress {
        /// Calories eaten (kcal)
        #[arg(long, default_value_t = 0.0)]
        consumed: f64,

        /// Calories burned by exercise (kcal)
        #[arg(long, default_value_t = 0.0)]
        burned: f64,

        /// Protein eaten (g)
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Carbohydrates eaten (g)
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Fat eaten (g)
        #[arg(long, default_value_t = 0.0)]
        fat: f64,

        /// Water drunk (ml, or fl oz with --units imperial)
        #[arg(long, default_value_t = 0.0)]
        water: f64,

        /// Calorie goal to compare against instead of the saved profile
        #[arg(long)]
        calorie_goal: Option<String>,

        /// Unit system for water input and display (metric, imperial)
        #[arg(short, long)]
        units: Option<UnitSystem>,

        /// Report format (text, json, csv)
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,
    },

    /// Convert a value between metric and imperial units
    Convert {
        /// Value to convert
        #[arg(allow_hyphen_values = true)]
        value: f64,

        /// Quantity (weight, height, portion, volume)
        #[arg(short, long, default_value = "weight")]
        quantity: String,

        /// Target unit system (metric, imperial)
        #[arg(short, long, default_value = "imperial")]
        to: UnitSystem,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the active configuration
        #[arg(long)]
        show: bool,

        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path));

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Calculate {
            weight,
            height,
            feet,
            inches,
            age,
            birthdate,
            sex,
            activity,
            goal,
            rate,
            units,
            adjust,
            reset,
            breakdown,
            format,
            output,
            save,
        } => {
            let units = units.unwrap_or(config.settings.default_units);
            let saved = config.profile.clone();
            let today = chrono::Local::now().date_naive();

            let weight_kg = match weight {
                Some(w) => UnitFormatter::weight(units).to_base(w),
                None => saved
                    .as_ref()
                    .map(|p| p.weight_kg)
                    .ok_or_else(|| anyhow!("--weight is required (no saved profile)"))?,
            };

            let height_cm = match (height, feet) {
                (_, Some(feet)) => from_feet_inches(feet, inches.unwrap_or(0)),
                (Some(h), None) => HeightFormatter::new(units).to_base(h),
                (None, None) => saved
                    .as_ref()
                    .map(|p| p.height_cm)
                    .ok_or_else(|| anyhow!("--height or --feet is required (no saved profile)"))?,
            };

            let saved_birthdate = saved.as_ref().map(|p| p.birthdate);
            let age = match (age, birthdate.or(saved_birthdate)) {
                (Some(age), _) => age,
                (None, Some(date)) => calculate_age(date, today),
                (None, None) => return Err(anyhow!("--age or --birthdate is required")),
            };

            let sex = sex
                .or(saved.as_ref().map(|p| p.sex))
                .ok_or_else(|| anyhow!("--sex is required (no saved profile)"))?;
            let activity_level = activity
                .or(saved.as_ref().map(|p| p.activity_level))
                .ok_or_else(|| anyhow!("--activity is required (no saved profile)"))?;
            let goal_type = goal
                .or(saved.as_ref().map(|p| p.goal_type))
                .unwrap_or(GoalType::Maintain);

            let weight_change_rate_kg = match (goal_type, rate) {
                (GoalType::Maintain, _) => 0.0,
                (_, Some(r)) => WeightChangeRate::new(0.0, units).to_kg(r),
                (_, None) => saved
                    .as_ref()
                    .filter(|p| p.goal_type == goal_type && p.weight_change_rate_kg > 0.0)
                    .map(|p| p.weight_change_rate_kg)
                    .unwrap_or_else(|| WeightChangeRate::default_rate_kg(units)),
            };

            let profile = BiometricProfile {
                weight_kg,
                height_cm,
                age,
                sex,
                activity_level,
            };
            let intent = GoalIntent {
                goal_type,
                weight_change_rate_kg,
            };

            validate_profile(&profile)
                .and_then(|_| validate_intent(&intent))
                .map_err(report_error)?;

            let calculator = config.calculator().map_err(report_error)?;
            let mut session = match saved.as_ref().and_then(|p| p.calorie_override) {
                Some(kcal) if !reset => {
                    GoalSession::restore(calculator.clone(), profile, intent, kcal)
                }
                _ => GoalSession::new(calculator.clone(), profile, intent),
            };

            for delta in adjust {
                if !session.adjust_calories(delta) {
                    eprintln!(
                        "{}",
                        format!("Adjustment {:+} kcal had no effect (limit reached)", delta).yellow()
                    );
                }
            }

            let mut report = GoalReport::from_session(&session, units);
            if breakdown {
                report = report.with_breakdown(calculator.breakdown(session.profile(), session.intent()));
            }

            let format = format.unwrap_or(config.settings.default_format);
            match output {
                Some(path) => {
                    write_report(&report, format, &path).map_err(report_error)?;
                    println!("{} {}", "✓ Report written to".green(), path.display());
                }
                None => {
                    if format == ExportFormat::Text {
                        println!("{}", "Daily nutrition goals".green().bold());
                    }
                    println!("{}", render(&report, format)?);
                    if session.is_customized() && format == ExportFormat::Text {
                        println!(
                            "{}",
                            format!(
                                "Customized from the recommended {} kcal (use --reset to restore)",
                                session.recommended().calories
                            )
                            .dimmed()
                        );
                    }
                }
            }

            if save {
                config.set_profile(ProfileConfig {
                    birthdate: birthdate
                        .or(saved_birthdate)
                        .unwrap_or_else(|| estimated_birthdate(today, age)),
                    sex,
                    height_cm,
                    weight_kg,
                    activity_level,
                    goal_type,
                    weight_change_rate_kg,
                    calorie_override: session
                        .is_customized()
                        .then(|| session.active().calories),
                });
                config.save_to_file(&config_path).map_err(report_error)?;
                println!("{} {}", "✓ Profile saved to".green(), config_path.display());
            }
        }

        Commands::Progress {
            consumed,
            burned,
            protein,
            carbs,
            fat,
            water,
            calorie_goal,
            units,
            format,
        } => {
            let units = units.unwrap_or(config.settings.default_units);
            let calculator = config.calculator().map_err(report_error)?;

            let goals = match (calorie_goal, config.profile.as_ref()) {
                (Some(input), _) => {
                    let kcal = validate_calorie_input(&input).map_err(report_error)?;
                    calculator.macros_for(kcal)
                }
                (None, Some(saved)) => {
                    let today = chrono::Local::now().date_naive();
                    saved.goal_session(calculator, today).active().clone()
                }
                (None, None) => {
                    return Err(anyhow!(
                        "--calorie-goal is required (no saved profile, see `calculate --save`)"
                    ))
                }
            };

            let intake = DailyIntake {
                calories_consumed: consumed,
                calories_burned: burned,
                protein_grams: protein,
                carbs_grams: carbs,
                fat_grams: fat,
                water_ml: UnitFormatter::volume(units).to_base(water),
            };
            let progress = DailyProgress::new(&goals, &intake, config.settings.water_goal_ml);

            let format = format.unwrap_or(config.settings.default_format);
            if format == ExportFormat::Text {
                println!("{}", "Today's progress".green().bold());
            }
            println!(
                "{}",
                render_progress(&progress, format, units).map_err(report_error)?
            );
        }

        Commands::Convert { value, quantity, to } => {
            let from = match to {
                UnitSystem::Metric => UnitSystem::Imperial,
                UnitSystem::Imperial => UnitSystem::Metric,
            };

            let (input, output) = match quantity.to_lowercase().as_str() {
                "weight" => formatter_pair(UnitFormatter::weight(from), UnitFormatter::weight(to), value),
                "portion" => formatter_pair(UnitFormatter::portion(from), UnitFormatter::portion(to), value),
                "volume" => formatter_pair(UnitFormatter::volume(from), UnitFormatter::volume(to), value),
                "height" => {
                    let source = HeightFormatter::new(from);
                    let target = HeightFormatter::new(to);
                    let base = source.to_base(value);
                    (
                        format!("{} {}", value, source.unit_label()),
                        target.format(base),
                    )
                }
                other => return Err(anyhow!("Unknown quantity: {}", other)),
            };

            println!("{} = {}", input, output.bold());
        }

        Commands::Config { init, show, path } => {
            if path {
                println!("{}", config_path.display());
            }

            if init {
                if config_path.exists() {
                    println!(
                        "{} {}",
                        "Configuration already exists:".yellow(),
                        config_path.display()
                    );
                } else {
                    let mut fresh = AppConfig::default();
                    fresh.save_to_file(&config_path).map_err(report_error)?;
                    println!("{} {}", "✓ Configuration written to".green(), config_path.display());
                }
            }

            if show || !(init || path) {
                let content = toml::to_string_pretty(&config)
                    .with_context(|| "Failed to serialize configuration")?;
                println!("{}", content);
            }
        }
    }

    Ok(())
}

/// Log an error at its severity, show the user-facing message, and hand it
/// back for `?`
fn report_error(err: impl Into<NutriGoalsError>) -> anyhow::Error {
    let err = err.into();
    match err.severity() {
        ErrorSeverity::Error => tracing::error!(error = %err, "Command failed"),
        ErrorSeverity::Warning => tracing::warn!(error = %err, "Rejected input"),
    }
    eprintln!("{}", err.user_message().red());
    err.into()
}

/// Render a value in its source units and converted to the target units
fn formatter_pair(source: UnitFormatter, target: UnitFormatter, value: f64) -> (String, String) {
    let base = source.to_base(value);
    (
        format!("{} {}", value, source.unit_label()),
        target.format(base),
    )
}

/// Birthdate stored when only an age was given: `age` years before today
fn estimated_birthdate(today: NaiveDate, age: u32) -> NaiveDate {
    today
        .checked_sub_months(chrono::Months::new(age * 12))
        .unwrap_or(today)
}
