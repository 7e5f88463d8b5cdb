use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use household_finance_core::portfolio::returns;
use household_finance_core::projection::{self, ProjectionInput};

/// Arguments for the multi-year asset projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,

    /// Pre-retirement horizon in years
    #[arg(long, default_value = "10")]
    pub years: u32,

    /// Inflation rate in percent (defaults to the snapshot's)
    #[arg(long)]
    pub inflation_rate: Option<Decimal>,

    /// Stop at retirement instead of simulating the drawdown
    #[arg(long)]
    pub no_post_retirement: bool,

    /// Age the post-retirement drawdown runs to
    #[arg(long, default_value = "83")]
    pub life_expectancy: u32,
}

/// Arguments for the weighted portfolio return
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let input = ProjectionInput {
        snapshot,
        years: args.years,
        inflation_rate: args.inflation_rate,
        include_post_retirement: !args.no_post_retirement,
        life_expectancy: args.life_expectancy,
    };
    let result = projection::project_future_assets(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = returns::compute_portfolio_return(&snapshot.assets, snapshot.total_assets)?;
    Ok(serde_json::to_value(result)?)
}
