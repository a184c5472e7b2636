use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::str::FromStr;

use crate::valuation::{
    ConditionParseError, ValuationError, ValuationInput, ValuationResult,
};

/// Generic message shown for any rejected submission.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input values. Please check your entries.";

/// Raw urlencoded fields posted by the calculator page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalculatorForm {
    #[serde(default)]
    pub acres: Option<String>,
    #[serde(default)]
    pub base_value: Option<String>,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub debris_level: Option<String>,
    #[serde(default)]
    pub slope: Option<String>,
    #[serde(default)]
    pub tree_density: Option<String>,
    #[serde(default)]
    pub needs_well: Option<String>,
    #[serde(default)]
    pub contamination_risk: Option<String>,
    #[serde(default)]
    pub flood_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} '{value}' is not a yes/no value")]
    InvalidFlag { field: &'static str, value: String },
    #[error(transparent)]
    Condition(#[from] ConditionParseError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl CalculatorForm {
    /// Parses the submitted text into a validated valuation input.
    pub fn to_input(&self) -> Result<ValuationInput, FormError> {
        let input = ValuationInput {
            acres: parse_amount("acres", self.acres.as_deref())?,
            base_value: parse_amount("base_value", self.base_value.as_deref())?,
            debris_level: self.debris_level.as_deref().unwrap_or_default().parse()?,
            slope: self.slope.as_deref().unwrap_or_default().parse()?,
            tree_density: self.tree_density.as_deref().unwrap_or_default().parse()?,
            needs_well: parse_flag("needs_well", self.needs_well.as_deref())?,
            contamination_risk: parse_flag(
                "contamination_risk",
                self.contamination_risk.as_deref(),
            )?,
            flood_zone: parse_flag("flood_zone", self.flood_zone.as_deref())?,
            county: self.county.as_deref().unwrap_or_default().trim().to_string(),
        };
        input.validate()?;
        Ok(input)
    }

    pub fn property_address(&self) -> Option<&str> {
        self.property_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }

    /// Subject document persisted alongside the calculation.
    pub fn subject_data(&self, input: &ValuationInput) -> Map<String, Value> {
        let mut subject = Map::new();
        subject.insert("acres".to_string(), json!(input.acres.to_string()));
        subject.insert("base_value".to_string(), json!(input.base_value.to_string()));
        if let Some(address) = self.property_address() {
            subject.insert("property_address".to_string(), json!(address));
        }
        if !input.county.is_empty() {
            subject.insert("county".to_string(), json!(input.county));
        }
        subject.insert(
            "site_conditions".to_string(),
            json!({
                "debris_level": input.debris_level,
                "slope": input.slope,
                "tree_density": input.tree_density,
                "needs_well": input.needs_well,
                "contamination_risk": input.contamination_risk,
                "flood_zone": input.flood_zone,
            }),
        );
        subject
    }
}

pub fn calculations_document(result: &ValuationResult) -> Map<String, Value> {
    let mut calculations = match serde_json::to_value(result) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Ok(impact) = serde_json::to_value(result.impact()) {
        calculations.insert("impact".to_string(), impact);
    }
    calculations
}

// A missing field counts as zero; a present but blank one is an error.
fn parse_amount(field: &'static str, raw: Option<&str>) -> Result<Decimal, FormError> {
    let Some(raw) = raw else {
        return Ok(Decimal::ZERO);
    };
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| FormError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_flag(field: &'static str, raw: Option<&str>) -> Result<bool, FormError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "y" | "1" => Ok(true),
        "" | "off" | "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(FormError::InvalidFlag {
            field,
            value: raw.to_string(),
        }),
    }
}
