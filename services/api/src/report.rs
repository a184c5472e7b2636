use land_valuation::valuation::format::{format_currency, format_number};
use land_valuation::valuation::ValuationResult;
use std::io::{self, Write};

pub(crate) fn write_report<W: Write>(out: &mut W, result: &ValuationResult) -> io::Result<()> {
    writeln!(out, "\n=== Calculation Results ===")?;

    writeln!(out, "\nProperty Details:")?;
    writeln!(out, "- Total Acres: {}", format_number(result.total_acres))?;
    writeln!(out, "- Base Value: {}", format_currency(result.base_value))?;

    writeln!(out, "\nAdjustments:")?;
    writeln!(
        out,
        "- Site Preparation Costs: {}",
        format_currency(result.site_prep_cost)
    )?;
    writeln!(
        out,
        "- Adjusted Value: {}",
        format_currency(result.adjusted_value)
    )?;

    writeln!(out, "\nFinal Values:")?;
    writeln!(
        out,
        "- Final Property Value: {}",
        format_currency(result.final_value)
    )?;
    writeln!(
        out,
        "- Value per Acre: {}",
        format_currency(result.value_per_acre)
    )?;

    writeln!(out, "\nTotal Value Impact: {}", result.impact())?;
    Ok(())
}
