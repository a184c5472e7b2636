use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat clearing and preparation charges, in dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePrepCharges {
    pub debris_heavy: Decimal,
    pub slope_moderate: Decimal,
    pub slope_steep: Decimal,
    pub trees_moderate: Decimal,
    pub trees_heavy: Decimal,
    pub well: Decimal,
}

/// Multipliers applied to the base value, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueAdjustments {
    pub contamination: Decimal,
    pub flood_zone: Decimal,
    pub major_county: Decimal,
}

/// Charge and adjustment table handed to the engine at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationRules {
    pub site_prep: SitePrepCharges,
    pub adjustments: ValueAdjustments,
    /// Lowercase county names eligible for the location premium.
    pub major_counties: Vec<String>,
}

impl ValuationRules {
    pub fn standard() -> Self {
        Self {
            site_prep: SitePrepCharges {
                debris_heavy: Decimal::from(5_000),
                slope_moderate: Decimal::from(3_000),
                slope_steep: Decimal::from(7_000),
                trees_moderate: Decimal::from(4_000),
                trees_heavy: Decimal::from(8_000),
                well: Decimal::from(15_000),
            },
            adjustments: ValueAdjustments {
                contamination: Decimal::new(70, 2),
                flood_zone: Decimal::new(85, 2),
                major_county: Decimal::new(120, 2),
            },
            major_counties: ["harris", "dallas", "travis"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_major_county(&self, county: &str) -> bool {
        let normalized = county.trim().to_lowercase();
        !normalized.is_empty() && self.major_counties.iter().any(|name| *name == normalized)
    }

    /// Title-cased county names for prompts and forms.
    pub fn major_county_labels(&self) -> Vec<String> {
        self.major_counties
            .iter()
            .map(|name| {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

impl Default for ValuationRules {
    fn default() -> Self {
        Self::standard()
    }
}
