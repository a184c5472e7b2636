use land_valuation::valuation::{ValuationEngine, ValuationRules};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn default_engine() -> ValuationEngine {
    ValuationEngine::new(ValuationRules::standard())
}

/// Parses a non-negative amount, tolerating `$` and thousands separators.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    let value = Decimal::from_str(&cleaned).map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("'{raw}' must be zero or greater"));
    }
    Ok(value)
}
