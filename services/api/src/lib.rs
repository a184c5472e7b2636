mod cli;
mod infra;
mod interactive;
mod report;
mod routes;
mod server;

use land_valuation::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
