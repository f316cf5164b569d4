//! Goal report rendering (text table, JSON, CSV)

use serde::{Deserialize, Serialize};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::ExportError;
use crate::goals::{GoalBreakdown, GoalSession};
use crate::models::{BiometricProfile, GoalIntent, GoalType, RoundedGoals, UnitSystem};
use crate::progress::{DailyProgress, TargetProgress};
use crate::units::{round_for_display, HeightFormatter, UnitFormatter, WeightChangeRate};

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "table" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Everything shown for one goal calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalReport {
    pub unit_system: UnitSystem,
    pub profile: BiometricProfile,
    pub intent: GoalIntent,

    /// Present when the breakdown was requested
    pub breakdown: Option<GoalBreakdown>,

    pub recommended_calories: u32,
    pub goals: RoundedGoals,
    pub customized: bool,
}

impl GoalReport {
    pub fn from_session(session: &GoalSession, unit_system: UnitSystem) -> Self {
        Self {
            unit_system,
            profile: session.profile().clone(),
            intent: session.intent().clone(),
            breakdown: None,
            recommended_calories: session.recommended().calories,
            goals: session.rounded(),
            customized: session.is_customized(),
        }
    }

    pub fn with_breakdown(mut self, breakdown: GoalBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl ReportRow {
    fn new(item: &str, value: impl Into<String>) -> Self {
        Self {
            item: item.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Serialize)]
struct CsvRow {
    unit_system: UnitSystem,
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: String,
    activity_level: String,
    goal_type: String,
    weight_change_rate_kg: f64,
    bmr: Option<f64>,
    tdee: Option<f64>,
    recommended_calories: u32,
    calories: u32,
    protein_g: u32,
    carbs_g: u32,
    fat_g: u32,
    customized: bool,
}

/// Render a report in the requested format
pub fn render(report: &GoalReport, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Text => Ok(render_text(report)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ExportFormat::Csv => render_csv(report),
    }
}

/// Render and write a report to `path`
pub fn write_report<P: AsRef<Path>>(
    report: &GoalReport,
    format: ExportFormat,
    path: P,
) -> Result<(), ExportError> {
    let content = render(report, format)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn render_text(report: &GoalReport) -> String {
    let system = report.unit_system;
    let weight = UnitFormatter::weight(system);
    let height = HeightFormatter::new(system);

    let mut rows = vec![
        ReportRow::new("Weight", weight.format(report.profile.weight_kg)),
        ReportRow::new("Height", height.format(report.profile.height_cm)),
        ReportRow::new("Age", report.profile.age.to_string()),
        ReportRow::new("Sex", report.profile.sex.label()),
        ReportRow::new(
            "Activity",
            format!(
                "{} ({})",
                report.profile.activity_level.label(),
                report.profile.activity_level.description()
            ),
        ),
        ReportRow::new("Goal", report.intent.goal_type.label()),
    ];

    if report.intent.goal_type != GoalType::Maintain {
        let rate = WeightChangeRate::new(report.intent.weight_change_rate_kg, system);
        rows.push(ReportRow::new("Rate", rate.format_current()));
    }

    if let Some(breakdown) = &report.breakdown {
        rows.push(ReportRow::new("BMR", format!("{} kcal", round_for_display(breakdown.bmr, 1))));
        rows.push(ReportRow::new("TDEE", format!("{} kcal", round_for_display(breakdown.tdee, 1))));
        rows.push(ReportRow::new(
            "Daily adjustment",
            format!("{:+} kcal", breakdown.daily_delta.round() as i64),
        ));
    }

    rows.push(ReportRow::new("Calories", format!("{} kcal", report.goals.calories)));
    rows.push(ReportRow::new("Protein", format!("{} g", report.goals.protein)));
    rows.push(ReportRow::new("Carbs", format!("{} g", report.goals.carbs)));
    rows.push(ReportRow::new("Fat", format!("{} g", report.goals.fat)));

    if report.customized {
        rows.push(ReportRow::new(
            "Recommended",
            format!("{} kcal", report.recommended_calories),
        ));
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn render_csv(report: &GoalReport) -> Result<String, ExportError> {
    let row = CsvRow {
        unit_system: report.unit_system,
        weight_kg: report.profile.weight_kg,
        height_cm: report.profile.height_cm,
        age: report.profile.age,
        sex: report.profile.sex.label().to_string(),
        activity_level: report.profile.activity_level.label().to_string(),
        goal_type: report.intent.goal_type.label().to_string(),
        weight_change_rate_kg: report.intent.weight_change_rate_kg,
        bmr: report.breakdown.as_ref().map(|b| b.bmr),
        tdee: report.breakdown.as_ref().map(|b| b.tdee),
        recommended_calories: report.recommended_calories,
        calories: report.goals.calories,
        protein_g: report.goals.protein,
        carbs_g: report.goals.carbs,
        fat_g: report.goals.fat,
        customized: report.customized,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(row)?;
    csv_string(writer)
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Consumed")]
    consumed: String,
    #[tabled(rename = "Goal")]
    goal: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

#[derive(Serialize)]
struct ProgressCsvRow {
    item: &'static str,
    unit: &'static str,
    consumed: f64,
    goal: f64,
    remaining: f64,
    progress: f64,
}

fn percent(progress: f64) -> String {
    format!("{}%", round_for_display(progress * 100.0, 0))
}

/// Render the daily progress summary. Water is shown in the display units of
/// `unit_system`; JSON and CSV stay metric.
pub fn render_progress(
    progress: &DailyProgress,
    format: ExportFormat,
    unit_system: UnitSystem,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Text => Ok(render_progress_text(progress, unit_system)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(progress)?),
        ExportFormat::Csv => render_progress_csv(progress),
    }
}

fn render_progress_text(progress: &DailyProgress, unit_system: UnitSystem) -> String {
    let calories = &progress.calories;
    let mut rows = vec![ProgressRow {
        item: "Calories (net)".to_string(),
        consumed: format!(
            "{} kcal ({} eaten, {} burned)",
            round_for_display(calories.net, 0),
            round_for_display(calories.consumed, 0),
            round_for_display(calories.burned, 0)
        ),
        goal: format!("{} kcal", calories.goal),
        remaining: format!("{} kcal", round_for_display(calories.remaining, 0)),
        progress: format!("{} ({})", percent(calories.progress), calories.level().label()),
    }];

    let grams = |item: &str, target: &TargetProgress| ProgressRow {
        item: item.to_string(),
        consumed: format!("{} g", round_for_display(target.consumed, 0)),
        goal: format!("{} g", round_for_display(target.goal, 0)),
        remaining: format!("{} g", round_for_display(target.remaining, 0)),
        progress: percent(target.progress),
    };
    rows.push(grams("Protein", &progress.protein));
    rows.push(grams("Carbs", &progress.carbs));
    rows.push(grams("Fat", &progress.fat));

    let volume = UnitFormatter::volume(unit_system);
    rows.push(ProgressRow {
        item: "Water".to_string(),
        consumed: volume.format(progress.water.consumed),
        goal: volume.format(progress.water.goal),
        remaining: volume.format(progress.water.remaining),
        progress: percent(progress.water.progress),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn render_progress_csv(progress: &DailyProgress) -> Result<String, ExportError> {
    let calories = &progress.calories;
    let mut rows = vec![ProgressCsvRow {
        item: "calories",
        unit: "kcal",
        consumed: calories.net,
        goal: calories.goal as f64,
        remaining: calories.remaining,
        progress: calories.progress,
    }];
    for (item, unit, target) in [
        ("protein", "g", &progress.protein),
        ("carbs", "g", &progress.carbs),
        ("fat", "g", &progress.fat),
        ("water", "ml", &progress.water),
    ] {
        rows.push(ProgressCsvRow {
            item,
            unit,
            consumed: target.consumed,
            goal: target.goal,
            remaining: target.remaining,
            progress: target.progress,
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    csv_string(writer)
}

fn csv_string(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| ExportError::Serialization {
        format: "csv".to_string(),
        reason: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|e| ExportError::Serialization {
        format: "csv".to_string(),
        reason: e.to_string(),
    })
}
