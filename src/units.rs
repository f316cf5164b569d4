//! Unit conversion layer
//!
//! Values are stored and calculated in metric base units (kg, cm, g, ml).
//! A [`UnitFormatter`] converts a base value to the user's display system and
//! back, and renders it with a unit label.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::UnitSystem;

// ============================================================================
// Conversion constants (metric -> imperial)
// ============================================================================

/// Pounds per kilogram
pub const KG_TO_LBS: f64 = 2.20462;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Inches per centimeter
pub const CM_TO_INCHES: f64 = 1.0 / CM_PER_INCH;
/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;
/// Centimeters per foot
pub const CM_PER_FOOT: f64 = 30.48;
/// Ounces per gram
pub const GRAMS_TO_OZ: f64 = 0.035274;
/// Fluid ounces per milliliter
pub const ML_TO_FLOZ: f64 = 0.033814;

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * KG_TO_LBS
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / KG_TO_LBS
}

/// Base value to display value: `base * factor` in imperial, identity in metric
pub fn to_display(base_value: f64, factor: f64, system: UnitSystem) -> f64 {
    match system {
        UnitSystem::Metric => base_value,
        UnitSystem::Imperial => base_value * factor,
    }
}

/// Display value back to base value: `display / factor` in imperial, identity in metric
pub fn to_base(display_value: f64, factor: f64, system: UnitSystem) -> f64 {
    match system {
        UnitSystem::Metric => display_value,
        UnitSystem::Imperial => display_value / factor,
    }
}

/// Round to `decimal_places` (half away from zero) and drop trailing zeros.
///
/// `70.0` renders as `"70"` and `154.32` at one place as `"154.3"`.
pub fn round_for_display(value: f64, decimal_places: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(d) => d
            .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        None => format!("{:.*}", decimal_places as usize, value),
    }
}

/// Round to exactly `decimal_places` (half away from zero), keeping trailing
/// zeros: `0.5` at two places is `"0.50"`, `0.125` is `"0.13"`.
pub fn round_fixed(value: f64, decimal_places: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(d) => {
            let mut rounded =
                d.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(decimal_places);
            rounded.to_string()
        }
        None => format!("{:.*}", decimal_places as usize, value),
    }
}

/// Convert a base value for `system` and render it as `"<value> <label>"`
pub fn format(
    base_value: f64,
    factor: f64,
    system: UnitSystem,
    unit_label: &str,
    decimal_places: u32,
) -> String {
    format!(
        "{} {}",
        round_for_display(to_display(base_value, factor, system), decimal_places),
        unit_label
    )
}

/// Generic metric/imperial formatter for one physical quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFormatter {
    /// Display system this formatter renders into
    pub system: UnitSystem,

    pub metric_unit: String,
    pub imperial_unit: String,

    /// Multiply a metric value by this to get the imperial value
    pub metric_to_imperial_factor: f64,

    /// Rounding resolution used by [`UnitFormatter::format`]
    pub decimal_places: u32,
}

impl UnitFormatter {
    pub fn new(
        system: UnitSystem,
        metric_unit: impl Into<String>,
        imperial_unit: impl Into<String>,
        metric_to_imperial_factor: f64,
        decimal_places: u32,
    ) -> Self {
        Self {
            system,
            metric_unit: metric_unit.into(),
            imperial_unit: imperial_unit.into(),
            metric_to_imperial_factor,
            decimal_places,
        }
    }

    /// Body weight: kg / lbs, one decimal
    pub fn weight(system: UnitSystem) -> Self {
        Self::new(system, "kg", "lbs", KG_TO_LBS, 1)
    }

    /// Height: cm / in, whole units
    pub fn height(system: UnitSystem) -> Self {
        Self::new(system, "cm", "in", CM_TO_INCHES, 0)
    }

    /// Food portions: g / oz, one decimal
    pub fn portion(system: UnitSystem) -> Self {
        Self::new(system, "g", "oz", GRAMS_TO_OZ, 1)
    }

    /// Liquids: ml / fl oz, whole units
    pub fn volume(system: UnitSystem) -> Self {
        Self::new(system, "ml", "fl oz", ML_TO_FLOZ, 0)
    }

    pub fn to_display(&self, base_value: f64) -> f64 {
        to_display(base_value, self.metric_to_imperial_factor, self.system)
    }

    pub fn to_base(&self, display_value: f64) -> f64 {
        to_base(display_value, self.metric_to_imperial_factor, self.system)
    }

    pub fn unit_label(&self) -> &str {
        match self.system {
            UnitSystem::Metric => &self.metric_unit,
            UnitSystem::Imperial => &self.imperial_unit,
        }
    }

    /// Convert a base value and render it as `"<value> <label>"`
    pub fn format(&self, base_value: f64) -> String {
        format(
            base_value,
            self.metric_to_imperial_factor,
            self.system,
            self.unit_label(),
            self.decimal_places,
        )
    }
}

/// Split a height into whole feet and rounded inches.
///
/// An inch value that rounds up to 12 carries into the next foot, so 182.6 cm
/// renders as 6' 0" rather than 5' 12".
pub fn to_feet_inches(height_cm: f64) -> (u32, u32) {
    let total_inches = height_cm / CM_PER_INCH;
    let mut feet = (total_inches / INCHES_PER_FOOT).floor() as u32;
    let mut inches = (total_inches % INCHES_PER_FOOT).round() as u32;
    if inches >= INCHES_PER_FOOT as u32 {
        feet += 1;
        inches = 0;
    }
    (feet, inches)
}

pub fn from_feet_inches(feet: u32, inches: u32) -> f64 {
    feet as f64 * CM_PER_FOOT + inches as f64 * CM_PER_INCH
}

/// Height formatter: centimeters in metric, feet and inches in imperial
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFormatter {
    base: UnitFormatter,
}

impl HeightFormatter {
    pub fn new(system: UnitSystem) -> Self {
        Self {
            base: UnitFormatter::height(system),
        }
    }

    pub fn to_display(&self, height_cm: f64) -> f64 {
        self.base.to_display(height_cm)
    }

    pub fn to_base(&self, display_value: f64) -> f64 {
        self.base.to_base(display_value)
    }

    pub fn unit_label(&self) -> &str {
        self.base.unit_label()
    }

    pub fn format(&self, height_cm: f64) -> String {
        match self.base.system {
            UnitSystem::Metric => self.base.format(height_cm),
            UnitSystem::Imperial => {
                let (feet, inches) = to_feet_inches(height_cm);
                format!("{}' {}\"", feet, inches)
            }
        }
    }
}

/// Slider bounds for the weekly weight change rate, in display units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub recommended: f64,
}

pub const METRIC_RATE_LIMITS: RateLimits = RateLimits {
    min: 0.25,
    max: 1.0,
    step: 0.25,
    recommended: 0.5,
};

pub const IMPERIAL_RATE_LIMITS: RateLimits = RateLimits {
    min: 0.5,
    max: 2.0,
    step: 0.5,
    recommended: 1.0,
};

/// Weekly weight change rate presented in the user's unit system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChangeRate {
    pub system: UnitSystem,
    pub display_value: f64,
    pub unit: &'static str,
    pub limits: RateLimits,
    pub decimal_places: u32,
}

impl WeightChangeRate {
    pub fn new(rate_kg: f64, system: UnitSystem) -> Self {
        match system {
            UnitSystem::Metric => Self {
                system,
                display_value: rate_kg,
                unit: "kg/week",
                limits: METRIC_RATE_LIMITS,
                decimal_places: 2,
            },
            UnitSystem::Imperial => Self {
                system,
                display_value: kg_to_lbs(rate_kg),
                unit: "lbs/week",
                limits: IMPERIAL_RATE_LIMITS,
                decimal_places: 1,
            },
        }
    }

    /// Recommended starting rate in kg/week for a unit system
    pub fn default_rate_kg(system: UnitSystem) -> f64 {
        match system {
            UnitSystem::Metric => METRIC_RATE_LIMITS.recommended,
            UnitSystem::Imperial => lbs_to_kg(IMPERIAL_RATE_LIMITS.recommended),
        }
    }

    /// Convert a slider value in display units back to kg/week
    pub fn to_kg(&self, display_value: f64) -> f64 {
        match self.system {
            UnitSystem::Metric => display_value,
            UnitSystem::Imperial => lbs_to_kg(display_value),
        }
    }

    pub fn format(&self, display_value: f64) -> String {
        format!("{} {}", round_fixed(display_value, self.decimal_places), self.unit)
    }

    pub fn format_current(&self) -> String {
        self.format(self.display_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_metric_is_identity() {
        let weight = UnitFormatter::weight(UnitSystem::Metric);
        assert_eq!(weight.to_display(70.0), 70.0);
        assert_eq!(weight.to_base(70.0), 70.0);
        assert_eq!(weight.unit_label(), "kg");
    }

    #[test]
    fn test_imperial_weight_format() {
        let weight = UnitFormatter::weight(UnitSystem::Imperial);
        assert_eq!(weight.format(70.0), "154.3 lbs");
        assert_eq!(UnitFormatter::weight(UnitSystem::Metric).format(70.0), "70 kg");
    }

    #[test]
    fn test_volume_and_portion_format() {
        assert_eq!(UnitFormatter::volume(UnitSystem::Imperial).format(250.0), "8 fl oz");
        assert_eq!(UnitFormatter::volume(UnitSystem::Metric).format(250.0), "250 ml");
        assert_eq!(UnitFormatter::portion(UnitSystem::Imperial).format(100.0), "3.5 oz");
    }

    #[test]
    fn test_round_for_display_midpoint() {
        assert_eq!(round_for_display(2.5, 0), "3");
        assert_eq!(round_for_display(-2.5, 0), "-3");
        assert_eq!(round_for_display(71.0, 1), "71");
        assert_eq!(round_for_display(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_feet_inches() {
        assert_eq!(to_feet_inches(175.0), (5, 9));
        assert_eq!(to_feet_inches(160.0), (5, 3));
        assert!((from_feet_inches(5, 9) - 175.26).abs() < 1e-9);
    }

    #[test]
    fn test_feet_inches_carry() {
        // 180.1 cm is 70.9 in: 5 ft + 10.9 in, rounds to 5' 11"
        assert_eq!(to_feet_inches(180.1), (5, 11));
        // 182.6 cm is 71.89 in: inches round to 12 and carry
        assert_eq!(to_feet_inches(182.6), (6, 0));
    }

    #[test]
    fn test_height_formatter() {
        assert_eq!(HeightFormatter::new(UnitSystem::Metric).format(175.4), "175 cm");
        assert_eq!(HeightFormatter::new(UnitSystem::Imperial).format(175.0), "5' 9\"");
        assert_eq!(HeightFormatter::new(UnitSystem::Imperial).unit_label(), "in");
    }

    #[test]
    fn test_weight_change_rate() {
        let rate = WeightChangeRate::new(0.5, UnitSystem::Imperial);
        assert_eq!(rate.unit, "lbs/week");
        assert_eq!(rate.format_current(), "1.1 lbs/week");
        assert!((rate.to_kg(1.0) - 0.453592).abs() < 1e-5);

        let rate = WeightChangeRate::new(0.5, UnitSystem::Metric);
        assert_eq!(rate.format_current(), "0.50 kg/week");
        assert_eq!(rate.limits, METRIC_RATE_LIMITS);
    }

    #[test]
    fn test_rate_rounds_ties_away_from_zero() {
        let rate = WeightChangeRate::new(0.125, UnitSystem::Metric);
        assert_eq!(rate.format_current(), "0.13 kg/week");
        assert_eq!(rate.format(1.0), "1.00 kg/week");

        let rate = WeightChangeRate::new(0.0, UnitSystem::Imperial);
        assert_eq!(rate.format(0.25), "0.3 lbs/week");
        assert_eq!(round_fixed(f64::NAN, 2), "NaN");
    }

    #[test]
    fn test_free_format() {
        assert_eq!(format(70.0, KG_TO_LBS, UnitSystem::Imperial, "lbs", 1), "154.3 lbs");
        assert_eq!(format(250.0, ML_TO_FLOZ, UnitSystem::Metric, "ml", 0), "250 ml");
    }

    #[test]
    fn test_default_rate() {
        assert_eq!(WeightChangeRate::default_rate_kg(UnitSystem::Metric), 0.5);
        let imperial = WeightChangeRate::default_rate_kg(UnitSystem::Imperial);
        assert!((imperial - 1.0 / KG_TO_LBS).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn test_round_trip_all_factors(value in 0.0f64..10_000.0) {
            for factor in [KG_TO_LBS, CM_TO_INCHES, GRAMS_TO_OZ, ML_TO_FLOZ] {
                let display = to_display(value, factor, UnitSystem::Imperial);
                let back = to_base(display, factor, UnitSystem::Imperial);
                prop_assert!((back - value).abs() < 1e-6);
            }
        }

        #[test]
        fn test_height_round_trip(cm in 100.0f64..=250.0) {
            let (feet, inches) = to_feet_inches(cm);
            prop_assert!(inches < 12);
            prop_assert!((from_feet_inches(feet, inches) - cm).abs() <= CM_PER_INCH);
        }
    }
}
