use crate::infra::{default_engine, parse_amount};
use crate::interactive::{run_session, Prompter};
use crate::report::write_report;
use crate::server;
use clap::{Args, Parser, Subcommand};
use land_valuation::calculator::ValuationResponse;
use land_valuation::config::AppConfig;
use land_valuation::error::AppError;
use land_valuation::telemetry;
use land_valuation::valuation::{DebrisLevel, SlopeCondition, TreeDensity, ValuationInput};
use rust_decimal::Decimal;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(
    name = "land-valuation",
    about = "Value land parcels and run the valuation back office from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Value a parcel from command-line flags
    Calculate(CalculateArgs),
    /// Walk through a valuation with interactive prompts
    Interactive,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Land area in acres
    #[arg(long, value_parser = parse_amount)]
    pub(crate) acres: Decimal,
    /// Base property value in dollars
    #[arg(long, value_parser = parse_amount)]
    pub(crate) base_value: Decimal,
    /// Debris level: none, moderate, heavy
    #[arg(long, default_value = "none")]
    pub(crate) debris_level: DebrisLevel,
    /// Slope condition: none, moderate, steep
    #[arg(long, default_value = "none")]
    pub(crate) slope: SlopeCondition,
    /// Tree density: none, moderate, heavy
    #[arg(long, default_value = "none")]
    pub(crate) tree_density: TreeDensity,
    /// The site needs a well drilled
    #[arg(long)]
    pub(crate) needs_well: bool,
    /// The site carries contamination risk
    #[arg(long)]
    pub(crate) contamination_risk: bool,
    /// The property lies in a flood zone
    #[arg(long)]
    pub(crate) flood_zone: bool,
    /// County name; Harris, Dallas, and Travis earn a premium
    #[arg(long, default_value = "")]
    pub(crate) county: String,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

impl CalculateArgs {
    fn to_input(&self) -> ValuationInput {
        ValuationInput {
            acres: self.acres,
            base_value: self.base_value,
            debris_level: self.debris_level,
            slope: self.slope,
            tree_density: self.tree_density,
            needs_well: self.needs_well,
            contamination_risk: self.contamination_risk,
            flood_zone: self.flood_zone,
            county: self.county.trim().to_string(),
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => {
            init_cli_telemetry()?;
            let stdout = io::stdout();
            run_calculate(&args, &mut stdout.lock())
        }
        Command::Interactive => {
            init_cli_telemetry()?;
            run_interactive()
        }
    }
}

fn init_cli_telemetry() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(())
}

pub(crate) fn run_calculate<W: Write>(args: &CalculateArgs, out: &mut W) -> Result<(), AppError> {
    let engine = default_engine();
    let result = engine.evaluate(&args.to_input())?;

    if args.json {
        let impact = result.impact();
        let body = serde_json::to_string_pretty(&ValuationResponse { result, impact })?;
        writeln!(out, "{body}")?;
    } else {
        write_report(out, &result)?;
    }
    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let engine = default_engine();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());

    match run_session(&engine, &mut prompter) {
        Err(AppError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
            writeln!(prompter.output(), "\nCalculator closed.")?;
            Ok(())
        }
        other => other,
    }
}
