use clap::Args;
use serde_json::{json, Value};

use household_finance_core::household::validation::{consistency_warnings, validate_snapshot};
use household_finance_core::household::HouseholdSnapshot;

/// Arguments for snapshot validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a JSON or YAML household snapshot
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot: HouseholdSnapshot = super::load(args.input.as_deref(), "household snapshot")?;
    validate_snapshot(&snapshot)?;
    Ok(json!({
        "result": {
            "valid": true,
            "years_to_retirement": snapshot.years_to_retirement(),
            "monthly_expense": snapshot.monthly_expense().to_string(),
            "net_assets": snapshot.net_assets().to_string(),
        },
        "warnings": consistency_warnings(&snapshot),
    }))
}
