//! Comparable-sales analysis: market value from the average price per square
//! foot, and an offer from the average price per acre.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::domain::SQUARE_FEET_PER_ACRE;

/// Shares of the estimated market value listed as negotiation tiers.
pub const OFFER_TIER_PERCENTAGES: [u32; 9] = [90, 80, 70, 60, 50, 40, 30, 20, 10];

/// A recent nearby sale used to price the subject property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSale {
    #[serde(default)]
    pub address: String,
    pub acres: Decimal,
    #[serde(default)]
    pub sq_ft: Option<Decimal>,
    pub sale_price: Decimal,
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
}

impl ComparableSale {
    /// Recorded square footage, or the acreage converted when none was recorded.
    pub fn square_feet(&self) -> Option<Decimal> {
        match self.sq_ft {
            Some(sq_ft) => Some(sq_ft),
            None => self.acres.checked_mul(Decimal::from(SQUARE_FEET_PER_ACRE)),
        }
    }

    pub fn price_per_acre(&self) -> Option<Decimal> {
        if self.acres <= Decimal::ZERO {
            return None;
        }
        self.sale_price.checked_div(self.acres)
    }

    pub fn price_per_sq_ft(&self) -> Option<Decimal> {
        let sq_ft = self.square_feet().filter(|sq_ft| *sq_ft > Decimal::ZERO)?;
        self.sale_price.checked_div(sq_ft)
    }
}

/// Percentage adjustments applied to the comparable-based offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferAdjustments {
    #[serde(default)]
    pub location: Decimal,
    #[serde(default)]
    pub development: Decimal,
    #[serde(default)]
    pub access: Decimal,
    #[serde(default)]
    pub utilities: Decimal,
}

impl OfferAdjustments {
    pub fn total_percent(&self) -> Option<Decimal> {
        [self.location, self.development, self.access, self.utilities]
            .into_iter()
            .try_fold(Decimal::ZERO, |total, percent| total.checked_add(percent))
    }
}

/// Body of an analysis request; sizes left out fall back to the project's own records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompsAnalysisRequest {
    #[serde(default)]
    pub subject_acres: Option<Decimal>,
    #[serde(default)]
    pub subject_sq_ft: Option<Decimal>,
    #[serde(default)]
    pub adjustments: OfferAdjustments,
}

/// Size of the property being priced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSize {
    pub acres: Decimal,
    pub sq_ft: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTier {
    pub percentage: u32,
    pub value: Decimal,
    pub per_sq_ft: Decimal,
    pub per_acre: Decimal,
}

/// Figures derived from a project's comparable sales, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompsAnalysis {
    pub comps_used: usize,
    pub average_price_per_acre: Decimal,
    pub average_price_per_sq_ft: Decimal,
    pub subject_acres: Decimal,
    pub subject_sq_ft: Decimal,
    pub estimated_market_value: Decimal,
    pub base_offer: Decimal,
    pub total_adjustment_percent: Decimal,
    pub offer_price: Decimal,
    pub offer_tiers: Vec<OfferTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompsError {
    #[error("at least one comparable sale with a positive price and size is required")]
    NoUsableComparables,
    #[error("comparable {index}: {field} must be zero or greater (got {value})")]
    NegativeFigure {
        index: usize,
        field: &'static str,
        value: Decimal,
    },
    #[error("subject acreage must be greater than zero")]
    MissingSubjectSize,
    #[error("{0} is outside the representable decimal range")]
    Overflow(&'static str),
}

/// Prices the subject from its comparables.
///
/// Comps without a positive price per acre or per square foot are skipped
/// for that average. The offer never drops below zero.
pub fn analyze(
    comps: &[ComparableSale],
    subject: &SubjectSize,
    adjustments: &OfferAdjustments,
) -> Result<CompsAnalysis, CompsError> {
    for (position, comp) in comps.iter().enumerate() {
        let index = position + 1;
        check_non_negative(index, "acres", comp.acres)?;
        check_non_negative(index, "sale_price", comp.sale_price)?;
        if let Some(sq_ft) = comp.sq_ft {
            check_non_negative(index, "sq_ft", sq_ft)?;
        }
    }

    if subject.acres <= Decimal::ZERO {
        return Err(CompsError::MissingSubjectSize);
    }
    let subject_sq_ft = match subject.sq_ft {
        Some(sq_ft) if sq_ft > Decimal::ZERO => sq_ft,
        Some(_) => return Err(CompsError::MissingSubjectSize),
        None => subject
            .acres
            .checked_mul(Decimal::from(SQUARE_FEET_PER_ACRE))
            .ok_or(CompsError::Overflow("subject square feet"))?,
    };

    let per_acre: Vec<Decimal> = positive_prices(comps, ComparableSale::price_per_acre);
    let per_sq_ft: Vec<Decimal> = positive_prices(comps, ComparableSale::price_per_sq_ft);
    if per_acre.is_empty() || per_sq_ft.is_empty() {
        return Err(CompsError::NoUsableComparables);
    }

    let average_price_per_acre = mean(&per_acre, "average price per acre")?;
    let average_price_per_sq_ft = mean(&per_sq_ft, "average price per square foot")?;

    let estimated_market_value = average_price_per_sq_ft
        .checked_mul(subject_sq_ft)
        .ok_or(CompsError::Overflow("estimated market value"))?;
    let base_offer = average_price_per_acre
        .checked_mul(subject.acres)
        .ok_or(CompsError::Overflow("base offer"))?;

    let total_adjustment_percent = adjustments
        .total_percent()
        .ok_or(CompsError::Overflow("adjustment total"))?;
    let multiplier = Decimal::ONE
        .checked_add(total_adjustment_percent / Decimal::ONE_HUNDRED)
        .ok_or(CompsError::Overflow("adjustment total"))?;
    let offer_price = base_offer
        .checked_mul(multiplier)
        .ok_or(CompsError::Overflow("offer price"))?
        .max(Decimal::ZERO);

    let offer_tiers = OFFER_TIER_PERCENTAGES
        .iter()
        .map(|&percentage| {
            offer_tier(
                percentage,
                estimated_market_value,
                subject.acres,
                subject_sq_ft,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompsAnalysis {
        comps_used: per_acre.len(),
        average_price_per_acre: cents(average_price_per_acre),
        average_price_per_sq_ft: cents(average_price_per_sq_ft),
        subject_acres: subject.acres,
        subject_sq_ft: cents(subject_sq_ft),
        estimated_market_value: cents(estimated_market_value),
        base_offer: cents(base_offer),
        total_adjustment_percent,
        offer_price: cents(offer_price),
        offer_tiers,
    })
}

fn offer_tier(
    percentage: u32,
    market_value: Decimal,
    acres: Decimal,
    sq_ft: Decimal,
) -> Result<OfferTier, CompsError> {
    // Dividing first keeps the product below the market value.
    let value = market_value / Decimal::ONE_HUNDRED * Decimal::from(percentage);
    let per_sq_ft = value
        .checked_div(sq_ft)
        .ok_or(CompsError::Overflow("tier price per square foot"))?;
    let per_acre = value
        .checked_div(acres)
        .ok_or(CompsError::Overflow("tier price per acre"))?;

    Ok(OfferTier {
        percentage,
        value: cents(value),
        per_sq_ft: cents(per_sq_ft),
        per_acre: cents(per_acre),
    })
}

fn check_non_negative(
    index: usize,
    field: &'static str,
    value: Decimal,
) -> Result<(), CompsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CompsError::NegativeFigure {
            index,
            field,
            value,
        });
    }
    Ok(())
}

fn positive_prices(
    comps: &[ComparableSale],
    price: fn(&ComparableSale) -> Option<Decimal>,
) -> Vec<Decimal> {
    comps
        .iter()
        .filter_map(price)
        .filter(|value| *value > Decimal::ZERO)
        .collect()
}

fn mean(values: &[Decimal], figure: &'static str) -> Result<Decimal, CompsError> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
        .and_then(|total| total.checked_div(Decimal::from(values.len())))
        .ok_or(CompsError::Overflow(figure))
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("valid decimal literal")
    }

    fn comp(acres: &str, sq_ft: Option<&str>, sale_price: &str) -> ComparableSale {
        ComparableSale {
            address: String::new(),
            acres: dec(acres),
            sq_ft: sq_ft.map(dec),
            sale_price: dec(sale_price),
            sale_date: None,
        }
    }

    fn subject() -> SubjectSize {
        SubjectSize {
            acres: dec("4"),
            sq_ft: Some(dec("200000")),
        }
    }

    #[test]
    fn averages_drive_market_value_and_offer() {
        let comps = [
            comp("10", Some("400000"), "100000"),
            comp("5", Some("250000"), "75000"),
            comp("0", None, "0"),
        ];
        let adjustments = OfferAdjustments {
            location: dec("10"),
            access: dec("-5"),
            ..OfferAdjustments::default()
        };

        let analysis = analyze(&comps, &subject(), &adjustments).expect("analysis succeeds");

        assert_eq!(analysis.comps_used, 2);
        assert_eq!(analysis.average_price_per_acre, dec("12500"));
        assert_eq!(analysis.average_price_per_sq_ft, dec("0.28"));
        assert_eq!(analysis.estimated_market_value, dec("55000"));
        assert_eq!(analysis.base_offer, dec("50000"));
        assert_eq!(analysis.total_adjustment_percent, dec("5"));
        assert_eq!(analysis.offer_price, dec("52500"));
    }

    #[test]
    fn tiers_scale_the_market_value() {
        let comps = [
            comp("10", Some("400000"), "100000"),
            comp("5", Some("250000"), "75000"),
        ];
        let analysis =
            analyze(&comps, &subject(), &OfferAdjustments::default()).expect("analysis succeeds");

        let percentages: Vec<u32> = analysis
            .offer_tiers
            .iter()
            .map(|tier| tier.percentage)
            .collect();
        assert_eq!(percentages, OFFER_TIER_PERCENTAGES.to_vec());

        let top = &analysis.offer_tiers[0];
        assert_eq!(top.value, dec("49500"));
        assert_eq!(top.per_sq_ft, dec("0.25"));
        assert_eq!(top.per_acre, dec("12375"));

        let bottom = &analysis.offer_tiers[8];
        assert_eq!(bottom.value, dec("5500"));
        assert_eq!(bottom.per_acre, dec("1375"));
    }

    #[test]
    fn square_feet_default_to_converted_acreage() {
        let sale = comp("2", None, "87120");
        assert_eq!(sale.square_feet(), Some(dec("87120")));
        assert_eq!(sale.price_per_sq_ft(), Some(dec("1")));
        assert_eq!(sale.price_per_acre(), Some(dec("43560")));

        let analysis = analyze(
            &[sale],
            &SubjectSize {
                acres: dec("1"),
                sq_ft: None,
            },
            &OfferAdjustments::default(),
        )
        .expect("analysis succeeds");
        assert_eq!(analysis.subject_sq_ft, dec("43560"));
        assert_eq!(analysis.estimated_market_value, dec("43560"));
    }

    #[test]
    fn steep_discounts_floor_the_offer_at_zero() {
        let adjustments = OfferAdjustments {
            development: dec("-150"),
            ..OfferAdjustments::default()
        };
        let analysis = analyze(&[comp("1", None, "1000")], &subject(), &adjustments)
            .expect("analysis succeeds");
        assert_eq!(analysis.offer_price, Decimal::ZERO);
    }

    #[test]
    fn unusable_input_is_rejected() {
        let none = analyze(&[], &subject(), &OfferAdjustments::default());
        assert_eq!(none, Err(CompsError::NoUsableComparables));

        let unpriced = analyze(
            &[comp("3", None, "0")],
            &subject(),
            &OfferAdjustments::default(),
        );
        assert_eq!(unpriced, Err(CompsError::NoUsableComparables));

        let negative = analyze(
            &[comp("1", None, "-5")],
            &subject(),
            &OfferAdjustments::default(),
        );
        assert_eq!(
            negative,
            Err(CompsError::NegativeFigure {
                index: 1,
                field: "sale_price",
                value: dec("-5"),
            })
        );

        let no_subject = analyze(
            &[comp("1", None, "1000")],
            &SubjectSize {
                acres: Decimal::ZERO,
                sq_ft: None,
            },
            &OfferAdjustments::default(),
        );
        assert_eq!(no_subject, Err(CompsError::MissingSubjectSize));
    }

    #[test]
    fn huge_figures_report_overflow() {
        let result = analyze(
            &[comp("1", Some("1"), &Decimal::MAX.to_string())],
            &SubjectSize {
                acres: dec("9999"),
                sq_ft: Some(dec("9999")),
            },
            &OfferAdjustments::default(),
        );
        assert_eq!(result, Err(CompsError::Overflow("estimated market value")));
    }
}
