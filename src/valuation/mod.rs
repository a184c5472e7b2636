//! Land valuation: flat site preparation charges plus multiplicative risk and
//! location adjustments, computed in exact decimal arithmetic.

mod domain;
pub mod format;
mod rules;

pub use domain::{
    ConditionParseError, DebrisLevel, SlopeCondition, TreeDensity, ValuationError,
    ValuationInput, ValuationResult, ValueImpact,
};
pub use rules::{SitePrepCharges, ValuationRules, ValueAdjustments};

use rust_decimal::Decimal;
use tracing::debug;

/// Stateless calculator that applies a rule table to parcel facts.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    rules: ValuationRules,
}

impl ValuationEngine {
    pub fn new(rules: ValuationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValuationRules {
        &self.rules
    }

    /// Validates the input before calculating.
    pub fn evaluate(&self, input: &ValuationInput) -> Result<ValuationResult, ValuationError> {
        input.validate()?;
        self.calculate(input)
    }

    /// Computes the valuation without bounds checks; negative figures flow through unchanged.
    /// Fails only when a figure leaves the representable decimal range.
    pub fn calculate(&self, input: &ValuationInput) -> Result<ValuationResult, ValuationError> {
        let site_prep_cost = self.site_prep_cost(input)?;
        let adjusted_value = self.adjusted_value(input)?;

        let final_value = adjusted_value
            .checked_sub(site_prep_cost)
            .ok_or(ValuationError::Overflow("final value"))?
            .max(Decimal::ZERO);
        let value_per_acre = if input.acres > Decimal::ZERO {
            final_value
                .checked_div(input.acres)
                .ok_or(ValuationError::Overflow("value per acre"))?
        } else {
            Decimal::ZERO
        };

        debug!(
            acres = %input.acres,
            base_value = %input.base_value,
            %site_prep_cost,
            %adjusted_value,
            %final_value,
            "valuation calculated"
        );

        Ok(ValuationResult {
            total_acres: input.acres,
            base_value: input.base_value,
            site_prep_cost,
            adjusted_value,
            final_value,
            value_per_acre,
        })
    }

    fn site_prep_cost(&self, input: &ValuationInput) -> Result<Decimal, ValuationError> {
        let charges = &self.rules.site_prep;

        let debris = match input.debris_level {
            DebrisLevel::Heavy => charges.debris_heavy,
            DebrisLevel::Moderate | DebrisLevel::None => Decimal::ZERO,
        };
        let slope = match input.slope {
            SlopeCondition::Moderate => charges.slope_moderate,
            SlopeCondition::Steep => charges.slope_steep,
            SlopeCondition::None => Decimal::ZERO,
        };
        let trees = match input.tree_density {
            TreeDensity::Heavy => charges.trees_heavy,
            TreeDensity::Moderate => charges.trees_moderate,
            TreeDensity::None => Decimal::ZERO,
        };
        let well = if input.needs_well {
            charges.well
        } else {
            Decimal::ZERO
        };

        [debris, slope, trees, well]
            .into_iter()
            .try_fold(Decimal::ZERO, |cost, charge| cost.checked_add(charge))
            .ok_or(ValuationError::Overflow("site preparation cost"))
    }

    // Order is fixed: contamination, flood zone, county premium.
    fn adjusted_value(&self, input: &ValuationInput) -> Result<Decimal, ValuationError> {
        let factors = &self.rules.adjustments;
        let applied = [
            (input.contamination_risk, factors.contamination),
            (input.flood_zone, factors.flood_zone),
            (self.rules.is_major_county(&input.county), factors.major_county),
        ];

        applied
            .into_iter()
            .filter(|(applies, _)| *applies)
            .try_fold(input.base_value, |value, (_, factor)| value.checked_mul(factor))
            .ok_or(ValuationError::Overflow("adjusted value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("valid decimal literal")
    }

    fn engine() -> ValuationEngine {
        ValuationEngine::new(ValuationRules::standard())
    }

    fn calc(input: &ValuationInput) -> ValuationResult {
        engine().calculate(input).expect("calculation succeeds")
    }

    #[test]
    fn no_flags_leaves_value_untouched() {
        let result = calc(&ValuationInput::new(dec("4"), dec("100000")));

        assert_eq!(result.site_prep_cost, Decimal::ZERO);
        assert_eq!(result.adjusted_value, dec("100000"));
        assert_eq!(result.final_value, dec("100000"));
        assert_eq!(result.value_per_acre, dec("25000"));
    }

    #[test]
    fn basic_site_conditions_scenario() {
        let input = ValuationInput::new(dec("10"), dec("100000"))
            .with_debris_level(DebrisLevel::Heavy)
            .with_slope(SlopeCondition::Moderate)
            .with_tree_density(TreeDensity::Moderate);

        let result = calc(&input);

        assert_eq!(result.total_acres, dec("10"));
        assert_eq!(result.base_value, dec("100000"));
        assert_eq!(result.site_prep_cost, dec("12000"));
        assert_eq!(result.adjusted_value, dec("100000"));
        assert_eq!(result.final_value, dec("88000"));
        assert_eq!(result.value_per_acre, dec("8800"));
    }

    #[test]
    fn all_deductions_scenario() {
        let input = ValuationInput::new(dec("5"), dec("200000"))
            .with_debris_level(DebrisLevel::Heavy)
            .with_slope(SlopeCondition::Steep)
            .with_tree_density(TreeDensity::Heavy)
            .with_well()
            .with_contamination_risk()
            .in_flood_zone();

        let result = calc(&input);

        assert_eq!(result.site_prep_cost, dec("35000"));
        assert_eq!(result.adjusted_value, dec("119000"));
        assert_eq!(result.final_value, dec("84000"));
        assert_eq!(result.value_per_acre, dec("16800"));
    }

    #[test]
    fn premium_county_scenario() {
        let input = ValuationInput::new(dec("2"), dec("150000"))
            .in_county("Dallas")
            .with_tree_density(TreeDensity::Moderate);

        let result = calc(&input);

        assert_eq!(result.site_prep_cost, dec("4000"));
        assert_eq!(result.adjusted_value, dec("180000"));
        assert_eq!(result.final_value, dec("176000"));
        assert_eq!(result.value_per_acre, dec("88000"));
    }

    #[test]
    fn zero_acres_yields_zero_per_acre() {
        let result = calc(&ValuationInput::new(Decimal::ZERO, dec("50000")));
        assert_eq!(result.final_value, dec("50000"));
        assert_eq!(result.value_per_acre, Decimal::ZERO);
    }

    #[test]
    fn final_value_never_goes_negative() {
        let input = ValuationInput::new(dec("1"), dec("10000"))
            .with_well()
            .with_slope(SlopeCondition::Steep);

        let result = calc(&input);

        assert_eq!(result.site_prep_cost, dec("22000"));
        assert_eq!(result.final_value, Decimal::ZERO);
        assert_eq!(result.value_per_acre, Decimal::ZERO);
    }

    #[test]
    fn risk_factors_compound_in_fixed_order() {
        let base = dec("123456.78");
        let contamination = calc(
            &ValuationInput::new(dec("1"), base).with_contamination_risk(),
        );
        assert_eq!(contamination.adjusted_value, base * dec("0.70"));

        let flood = calc(&ValuationInput::new(dec("1"), base).in_flood_zone());
        assert_eq!(flood.adjusted_value, base * dec("0.85"));

        let both = calc(
            &ValuationInput::new(dec("1"), base)
                .in_flood_zone()
                .with_contamination_risk()
                .in_county("travis"),
        );
        assert_eq!(
            both.adjusted_value,
            base * dec("0.70") * dec("0.85") * dec("1.20")
        );
    }

    #[test]
    fn moderate_debris_carries_no_charge() {
        let input =
            ValuationInput::new(dec("1"), dec("1000")).with_debris_level(DebrisLevel::Moderate);
        assert_eq!(calc(&input).site_prep_cost, Decimal::ZERO);
    }

    #[test]
    fn exclusive_categories_charge_once() {
        let steep = calc(
            &ValuationInput::new(dec("1"), dec("1000")).with_slope(SlopeCondition::Steep),
        );
        assert_eq!(steep.site_prep_cost, dec("7000"));

        let heavy = calc(
            &ValuationInput::new(dec("1"), dec("1000")).with_tree_density(TreeDensity::Heavy),
        );
        assert_eq!(heavy.site_prep_cost, dec("8000"));
    }

    #[test]
    fn non_major_county_gets_no_premium() {
        for county in ["", "  ", "Bexar", "Harris County"] {
            let result =
                calc(&ValuationInput::new(dec("1"), dec("1000")).in_county(county));
            assert_eq!(result.adjusted_value, dec("1000"), "county {county:?}");
        }
    }

    #[test]
    fn substituted_rules_are_honored() {
        let mut rules = ValuationRules::standard();
        rules.site_prep.well = dec("20000");
        rules.major_counties = vec!["bexar".to_string()];
        let engine = ValuationEngine::new(rules);

        let result = engine.calculate(
            &ValuationInput::new(dec("1"), dec("100000"))
                .with_well()
                .in_county("Bexar"),
        )
        .expect("calculation succeeds");

        assert_eq!(result.site_prep_cost, dec("20000"));
        assert_eq!(result.adjusted_value, dec("120000"));
        assert_eq!(result.final_value, dec("100000"));
    }

    #[test]
    fn evaluate_rejects_negative_input() {
        let err = engine()
            .evaluate(&ValuationInput::new(dec("-2"), dec("1000")))
            .unwrap_err();
        assert_eq!(err, ValuationError::NegativeAcres(dec("-2")));
    }

    #[test]
    fn calculate_propagates_negative_base_value() {
        let result = calc(&ValuationInput::new(dec("1"), dec("-500")));
        assert_eq!(result.adjusted_value, dec("-500"));
        assert_eq!(result.final_value, Decimal::ZERO);
    }

    #[test]
    fn tiny_acreage_reports_overflow_instead_of_panicking() {
        let input = ValuationInput::new(dec("0.0000000000000000000000000001"), dec("1000000"));
        assert_eq!(
            engine().evaluate(&input),
            Err(ValuationError::Overflow("value per acre"))
        );
    }

    #[test]
    fn premium_on_maximum_value_reports_overflow() {
        let input = ValuationInput::new(dec("1"), Decimal::MAX).in_county("Dallas");
        assert_eq!(
            engine().evaluate(&input),
            Err(ValuationError::Overflow("adjusted value"))
        );
    }

    #[test]
    fn maximum_value_without_multipliers_still_calculates() {
        let result = calc(&ValuationInput::new(dec("1"), Decimal::MAX).with_well());
        assert_eq!(result.final_value, Decimal::MAX - dec("15000"));
    }
}
