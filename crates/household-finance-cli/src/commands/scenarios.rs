use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use household_finance_core::scenarios::scenario::{self, ScenarioDelta, ScenarioInput};

/// Arguments for what-if scenario comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScenariosArgs {
    /// Path to a JSON or YAML document with `snapshot` and `scenarios`
    #[arg(long)]
    pub input: Option<String>,

    /// Extra scenario as NAME:EXPENSE_PCT:SALARY_GROWTH_PCT (repeatable),
    /// e.g. "frugal:-10:0"
    #[arg(long = "scenario")]
    pub scenarios: Vec<String>,

    /// Overrides the horizon in the input document
    #[arg(long)]
    pub years: Option<u32>,
}

fn parse_delta(raw: &str) -> Result<ScenarioDelta, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return Err(format!(
            "invalid --scenario '{raw}': expected NAME:EXPENSE_PCT:SALARY_GROWTH_PCT"
        )
        .into());
    }
    let expense: Decimal = parts[1]
        .trim()
        .parse()
        .map_err(|e| format!("invalid expense change in '{raw}': {e}"))?;
    let growth: Decimal = parts[2]
        .trim()
        .parse()
        .map_err(|e| format!("invalid salary growth change in '{raw}': {e}"))?;
    Ok(ScenarioDelta {
        name: parts[0].trim().to_string(),
        expense_change_pct: expense,
        salary_growth_change_pct: growth,
    })
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: ScenarioInput = super::load(args.input.as_deref(), "scenario comparison")?;
    input.snapshot = super::checked(input.snapshot)?;

    for raw in &args.scenarios {
        input.scenarios.push(parse_delta(raw)?);
    }
    if let Some(years) = args.years {
        input.years = years;
    }

    let result = scenario::compare_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}
