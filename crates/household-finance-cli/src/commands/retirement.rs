use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use household_finance_core::retirement::goal::{self, BisectionConfig};
use household_finance_core::retirement::sustainability;

/// Arguments for evaluating a retirement goal
#[derive(Args)]
pub struct GoalArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly contribution until retirement
    #[arg(long)]
    pub contribution: Decimal,

    /// Expected annual return in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub return_rate: Decimal,

    /// Withdrawal rate in percent (defaults to the snapshot's)
    #[arg(long)]
    pub withdrawal_rate: Option<Decimal>,
}

/// Arguments for solving the monthly contribution
#[derive(Args)]
pub struct OptimalContributionArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,

    /// Annual return to plan with, in percent
    #[arg(long)]
    pub target_return: Decimal,

    /// Withdrawal rate in percent (defaults to the snapshot's)
    #[arg(long)]
    pub withdrawal_rate: Option<Decimal>,
}

/// Arguments for solving the required annual return
#[derive(Args)]
pub struct RequiredReturnArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly contribution until retirement
    #[arg(long)]
    pub contribution: Decimal,

    /// Withdrawal rate in percent (defaults to the snapshot's)
    #[arg(long)]
    pub withdrawal_rate: Option<Decimal>,

    /// Lower bound of the search bracket, in percent
    #[arg(long)]
    pub lower: Option<Decimal>,

    /// Upper bound of the search bracket, in percent
    #[arg(long)]
    pub upper: Option<Decimal>,

    /// Accepted gap between projected and target assets
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    #[arg(long)]
    pub max_iterations: Option<u32>,
}

/// Arguments for the retirement sustainability check
#[derive(Args)]
pub struct SustainabilityArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_goal(args: GoalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let withdrawal = args.withdrawal_rate.unwrap_or(snapshot.withdrawal_rate);
    let result =
        goal::compute_retirement_goal(&snapshot, args.contribution, args.return_rate, withdrawal)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_optimal_contribution(
    args: OptimalContributionArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let withdrawal = args.withdrawal_rate.unwrap_or(snapshot.withdrawal_rate);
    let result = goal::find_optimal_contribution(&snapshot, args.target_return, withdrawal)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_required_return(args: RequiredReturnArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let withdrawal = args.withdrawal_rate.unwrap_or(snapshot.withdrawal_rate);

    let defaults = BisectionConfig::default();
    let config = BisectionConfig {
        lower: args.lower.unwrap_or(defaults.lower),
        upper: args.upper.unwrap_or(defaults.upper),
        tolerance: args.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: args.max_iterations.unwrap_or(defaults.max_iterations),
    };

    let result =
        goal::find_required_return_rate_with(&snapshot, args.contribution, withdrawal, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sustainability(args: SustainabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = sustainability::assess_retirement_sustainability(&snapshot)?;
    Ok(serde_json::to_value(result)?)
}
