use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raised when a condition token does not belong to the accepted vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} '{value}' (expected one of: {expected})")]
pub struct ConditionParseError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum DebrisLevel {
    #[default]
    None,
    Moderate,
    Heavy,
}

impl DebrisLevel {
    pub const VOCABULARY: &'static str = "none, moderate, heavy";

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

impl FromStr for DebrisLevel {
    type Err = ConditionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_token(value).as_str() {
            "" | "none" => Ok(Self::None),
            "moderate" => Ok(Self::Moderate),
            "heavy" => Ok(Self::Heavy),
            _ => Err(ConditionParseError {
                field: "debris level",
                value: value.to_string(),
                expected: Self::VOCABULARY,
            }),
        }
    }
}

impl TryFrom<String> for DebrisLevel {
    type Error = ConditionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SlopeCondition {
    #[default]
    None,
    Moderate,
    Steep,
}

impl SlopeCondition {
    pub const VOCABULARY: &'static str = "none, moderate, steep";

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::Steep => "steep",
        }
    }
}

impl FromStr for SlopeCondition {
    type Err = ConditionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_token(value).as_str() {
            "" | "none" => Ok(Self::None),
            "moderate" => Ok(Self::Moderate),
            "steep" => Ok(Self::Steep),
            _ => Err(ConditionParseError {
                field: "slope",
                value: value.to_string(),
                expected: Self::VOCABULARY,
            }),
        }
    }
}

impl TryFrom<String> for SlopeCondition {
    type Error = ConditionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Tree cover on the site. The web dashboard submits the `*_woods` spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TreeDensity {
    #[default]
    None,
    Moderate,
    Heavy,
}

impl TreeDensity {
    pub const VOCABULARY: &'static str = "none, moderate, heavy";

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

impl FromStr for TreeDensity {
    type Err = ConditionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_token(value).as_str() {
            "" | "none" => Ok(Self::None),
            "moderate" | "moderate_woods" => Ok(Self::Moderate),
            "heavy" | "heavy_woods" => Ok(Self::Heavy),
            _ => Err(ConditionParseError {
                field: "tree density",
                value: value.to_string(),
                expected: Self::VOCABULARY,
            }),
        }
    }
}

impl TryFrom<String> for TreeDensity {
    type Error = ConditionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parcel facts fed into a single valuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    pub acres: Decimal,
    pub base_value: Decimal,
    #[serde(default)]
    pub debris_level: DebrisLevel,
    #[serde(default)]
    pub slope: SlopeCondition,
    #[serde(default)]
    pub tree_density: TreeDensity,
    #[serde(default)]
    pub needs_well: bool,
    #[serde(default)]
    pub contamination_risk: bool,
    #[serde(default)]
    pub flood_zone: bool,
    #[serde(default)]
    pub county: String,
}

impl ValuationInput {
    pub fn new(acres: Decimal, base_value: Decimal) -> Self {
        Self {
            acres,
            base_value,
            ..Self::default()
        }
    }

    pub fn with_debris_level(mut self, level: DebrisLevel) -> Self {
        self.debris_level = level;
        self
    }

    pub fn with_slope(mut self, slope: SlopeCondition) -> Self {
        self.slope = slope;
        self
    }

    pub fn with_tree_density(mut self, density: TreeDensity) -> Self {
        self.tree_density = density;
        self
    }

    pub fn with_well(mut self) -> Self {
        self.needs_well = true;
        self
    }

    pub fn with_contamination_risk(mut self) -> Self {
        self.contamination_risk = true;
        self
    }

    pub fn in_flood_zone(mut self) -> Self {
        self.flood_zone = true;
        self
    }

    pub fn in_county(mut self, county: impl Into<String>) -> Self {
        self.county = county.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.acres.is_sign_negative() && !self.acres.is_zero() {
            return Err(ValuationError::NegativeAcres(self.acres));
        }
        if self.base_value.is_sign_negative() && !self.base_value.is_zero() {
            return Err(ValuationError::NegativeBaseValue(self.base_value));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationError {
    #[error("acres must be zero or greater (got {0})")]
    NegativeAcres(Decimal),
    #[error("base value must be zero or greater (got {0})")]
    NegativeBaseValue(Decimal),
    #[error("{0} is outside the representable decimal range")]
    Overflow(&'static str),
}

/// Output of one valuation. Decimals serialize as strings so no precision is lost in transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub total_acres: Decimal,
    pub base_value: Decimal,
    pub site_prep_cost: Decimal,
    pub adjusted_value: Decimal,
    pub final_value: Decimal,
    pub value_per_acre: Decimal,
}

impl ValuationResult {
    pub fn impact(&self) -> ValueImpact {
        let total_impact = self.final_value - self.base_value;
        let impact_percentage = if self.base_value.is_zero() {
            None
        } else {
            Some(total_impact / self.base_value * Decimal::ONE_HUNDRED)
        };

        ValueImpact {
            total_impact,
            impact_percentage,
        }
    }
}

/// Net change from the base value once every adjustment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueImpact {
    pub total_impact: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_percentage: Option<Decimal>,
}

impl fmt::Display for ValueImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = super::format::format_currency(self.total_impact);
        match self.impact_percentage {
            Some(percentage) => write!(
                f,
                "{amount} ({})",
                super::format::format_percentage(percentage)
            ),
            None => write!(f, "{amount} (n/a)"),
        }
    }
}
