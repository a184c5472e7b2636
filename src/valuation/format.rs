use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a dollar amount as `$1,234.56`, negatives as `-$1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let grouped = format_number(value.abs());
    if value.is_sign_negative() && !rounds_to_zero(value, 2) {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Formats a quantity with thousands separators and two decimal places.
pub fn format_number(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let rendered = format!("{:.2}", rounded.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

/// Formats a percentage with one decimal place, e.g. `-12.3%`.
pub fn format_percentage(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        return "0.0%".to_string();
    }
    format!("{rounded:.1}%")
}

fn rounds_to_zero(value: Decimal, places: u32) -> bool {
    value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
        .is_zero()
}
