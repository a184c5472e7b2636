pub mod calculator;
pub mod config;
pub mod error;
pub mod projects;
pub mod telemetry;
pub mod valuation;
