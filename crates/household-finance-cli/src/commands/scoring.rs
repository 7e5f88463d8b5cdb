use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use household_finance_core::scoring::{health, risk};

/// Arguments shared by the snapshot-only scoring commands
#[derive(Args)]
pub struct ScoringArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the market-crisis stress test
#[derive(Args)]
pub struct CrisisArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,

    /// Immediate drop in asset values, in percent
    #[arg(long, default_value_t = risk::DEFAULT_ASSET_DROP)]
    pub drop: Decimal,
}

pub fn run_health(args: ScoringArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = health::financial_health_grade(&snapshot)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_risk(args: ScoringArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = risk::risk_score(&snapshot)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_survival(args: ScoringArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = risk::income_interruption_survival(&snapshot)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_crisis(args: CrisisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(args.input.as_deref())?;
    let result = risk::crisis_scenario(&snapshot, args.drop)?;
    Ok(serde_json::to_value(result)?)
}
