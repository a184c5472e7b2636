use land_valuation::error::AppError;
use land_valuation::valuation::{
    DebrisLevel, SlopeCondition, TreeDensity, ValuationEngine, ValuationInput,
};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::debug;

use crate::report::write_report;

/// Line-oriented prompt loop that re-asks until an answer is acceptable.
pub(crate) struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub(crate) fn output(&mut self) -> &mut W {
        &mut self.output
    }

    // End of input surfaces as `UnexpectedEof` so the caller can close cleanly.
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    pub(crate) fn yes_no(&mut self, prompt: &str) -> io::Result<bool> {
        loop {
            let answer = self.ask(&format!("{prompt} (y/n): "))?.to_lowercase();
            match answer.as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please enter 'y' or 'n'")?,
            }
        }
    }

    pub(crate) fn amount(&mut self, prompt: &str, min_value: Decimal) -> io::Result<Decimal> {
        loop {
            let answer = self.ask(prompt)?;
            let cleaned: String = answer.chars().filter(|c| !matches!(c, '$' | ',')).collect();
            match Decimal::from_str(&cleaned) {
                Ok(value) if value >= min_value => return Ok(value),
                Ok(_) => writeln!(
                    self.output,
                    "Please enter a value greater than or equal to {min_value}"
                )?,
                Err(_) => writeln!(self.output, "Please enter a valid number")?,
            }
        }
    }

    /// Asks for one token of `options`; blank answers are rejected rather than read as "none".
    pub(crate) fn choice<T: FromStr>(&mut self, prompt: &str, options: &[&str]) -> io::Result<T> {
        let listing = options.join("/");
        loop {
            let answer = self.ask(&format!("{prompt} ({listing}): "))?;
            if !answer.is_empty() {
                if let Ok(value) = answer.parse::<T>() {
                    return Ok(value);
                }
            }
            writeln!(self.output, "Please enter {}", quoted_options(options))?;
        }
    }

    pub(crate) fn text(&mut self, prompt: &str) -> io::Result<String> {
        self.ask(prompt)
    }
}

fn quoted_options(options: &[&str]) -> String {
    let quoted: Vec<String> = options.iter().map(|option| format!("'{option}'")).collect();
    match quoted.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, [only])) => format!("{only} or {last}"),
        Some((last, rest)) => format!("{}, or {last}", rest.join(", ")),
        None => String::new(),
    }
}

/// Collects every field, runs the engine, and prints the report.
pub(crate) fn run_session<R: BufRead, W: Write>(
    engine: &ValuationEngine,
    prompter: &mut Prompter<R, W>,
) -> Result<(), AppError> {
    writeln!(prompter.output(), "\n=== Texas Land Value Calculator ===\n")?;

    let acres = prompter.amount("Enter number of acres: ", Decimal::ZERO)?;
    let base_value = prompter.amount("Enter base value ($): ", Decimal::ZERO)?;

    writeln!(prompter.output(), "\n--- Site Conditions ---")?;
    let debris_level: DebrisLevel =
        prompter.choice("Enter debris level", &["none", "moderate", "heavy"])?;
    let slope: SlopeCondition =
        prompter.choice("Enter slope condition", &["none", "moderate", "steep"])?;
    let tree_density: TreeDensity =
        prompter.choice("Enter tree density", &["none", "moderate", "heavy"])?;
    let needs_well = prompter.yes_no("Does the site need a well")?;

    writeln!(prompter.output(), "\n--- Risk Factors ---")?;
    let contamination_risk = prompter.yes_no("Is there contamination risk")?;
    let flood_zone = prompter.yes_no("Is the property in a flood zone")?;

    writeln!(prompter.output(), "\n--- Location Information ---")?;
    let counties = engine.rules().major_county_labels().join(", ");
    writeln!(
        prompter.output(),
        "Major counties (premium pricing): {counties}"
    )?;
    let county = prompter.text("Enter county name (or press Enter to skip): ")?;

    let input = ValuationInput {
        acres,
        base_value,
        debris_level,
        slope,
        tree_density,
        needs_well,
        contamination_risk,
        flood_zone,
        county,
    };
    debug!(?input, "interactive input collected");

    let result = engine.evaluate(&input)?;
    write_report(prompter.output(), &result)?;
    Ok(())
}
