use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HouseholdFinanceError;
use crate::household::HouseholdSnapshot;
use crate::projection::{simulate, ProjectionOptions, YearlyRecord};
use crate::time_value::fraction;
use crate::types::*;
use crate::HouseholdFinanceResult;

fn default_years() -> u32 {
    10
}

fn default_include_post_retirement() -> bool {
    true
}

/// A named what-if adjustment to the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub name: String,
    /// Relative change applied to fixed and variable monthly expenses
    /// (-10 = spend 10% less).
    #[serde(default)]
    pub expense_change_pct: Percent,
    /// Added to the salary growth rate, in percentage points.
    #[serde(default)]
    pub salary_growth_change_pct: Percent,
}

/// Input for scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub snapshot: HouseholdSnapshot,
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default = "default_include_post_retirement")]
    pub include_post_retirement: bool,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDelta>,
}

/// Projection outcome for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub name: String,
    pub expense_change_pct: Percent,
    pub salary_growth_change_pct: Percent,
    pub future_assets: Money,
    pub total_savings: Money,
    /// `future_assets` minus the base case's.
    pub difference_from_base: Money,
    pub yearly_records: Vec<YearlyRecord>,
}

/// Output of scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub base: ScenarioRun,
    pub scenarios: Vec<ScenarioRun>,
    pub best_scenario: Option<String>,
    pub worst_scenario: Option<String>,
}

/// Return a modified copy of the snapshot. The input is never touched.
pub fn apply_scenario(
    snapshot: &HouseholdSnapshot,
    expense_delta_pct: Percent,
    salary_growth_delta_pct: Percent,
) -> HouseholdSnapshot {
    let scale = Decimal::ONE + fraction(expense_delta_pct);
    HouseholdSnapshot {
        monthly_fixed_expense: snapshot.monthly_fixed_expense * scale,
        monthly_variable_expense: snapshot.monthly_variable_expense * scale,
        salary_growth_rate: snapshot.salary_growth_rate + salary_growth_delta_pct,
        ..snapshot.clone()
    }
}

fn run(
    snapshot: &HouseholdSnapshot,
    delta: &ScenarioDelta,
    years: u32,
    include_post_retirement: bool,
    base_assets: Money,
) -> ScenarioRun {
    let modified = apply_scenario(
        snapshot,
        delta.expense_change_pct,
        delta.salary_growth_change_pct,
    );
    let mut options = ProjectionOptions::for_snapshot(&modified, years);
    options.include_post_retirement = include_post_retirement;
    let result = simulate(&modified, &options);

    ScenarioRun {
        name: delta.name.clone(),
        expense_change_pct: delta.expense_change_pct,
        salary_growth_change_pct: delta.salary_growth_change_pct,
        future_assets: result.future_assets,
        total_savings: result.total_savings,
        difference_from_base: result.future_assets - base_assets,
        yearly_records: result.yearly_records,
    }
}

/// Project the base case and every scenario on its own copy of the snapshot,
/// then rank the scenarios by final assets. Ties keep the earlier scenario.
pub fn compare_scenarios(
    input: &ScenarioInput,
) -> HouseholdFinanceResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (i, s) in input.scenarios.iter().enumerate() {
        if s.expense_change_pct < dec!(-100) {
            return Err(HouseholdFinanceError::invalid(
                &format!("scenarios[{i}].expense_change_pct"),
                "must be >= -100",
            ));
        }
        if input.snapshot.salary_growth_rate + s.salary_growth_change_pct < dec!(-100) {
            return Err(HouseholdFinanceError::invalid(
                &format!("scenarios[{i}].salary_growth_change_pct"),
                "salary growth rate plus change must be >= -100",
            ));
        }
    }

    let base_delta = ScenarioDelta {
        name: "base".into(),
        expense_change_pct: Decimal::ZERO,
        salary_growth_change_pct: Decimal::ZERO,
    };
    let mut base = run(
        &input.snapshot,
        &base_delta,
        input.years,
        input.include_post_retirement,
        Decimal::ZERO,
    );
    base.difference_from_base = Decimal::ZERO;

    let scenarios: Vec<ScenarioRun> = input
        .scenarios
        .iter()
        .map(|d| {
            run(
                &input.snapshot,
                d,
                input.years,
                input.include_post_retirement,
                base.future_assets,
            )
        })
        .collect();

    let mut best: Option<&ScenarioRun> = None;
    let mut worst: Option<&ScenarioRun> = None;
    for s in &scenarios {
        if best.map_or(true, |b| s.future_assets > b.future_assets) {
            best = Some(s);
        }
        if worst.map_or(true, |w| s.future_assets < w.future_assets) {
            worst = Some(s);
        }
    }
    let best_scenario = best.map(|s| s.name.clone());
    let worst_scenario = worst.map(|s| s.name.clone());

    if scenarios.is_empty() {
        warnings.push("No scenarios supplied; only the base case was projected".into());
    }

    let output = ScenarioOutput {
        base,
        scenarios,
        best_scenario,
        worst_scenario,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Independent projections per scenario, ranked by final assets",
        &serde_json::json!({
            "years": input.years,
            "num_scenarios": input.scenarios.len(),
            "include_post_retirement": input.include_post_retirement,
        }),
        warnings,
        elapsed,
        output,
    ))
}
