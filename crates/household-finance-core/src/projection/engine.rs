use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::household::validation::{validate_inflation_rate, validate_life_expectancy};
use crate::household::{HouseholdSnapshot, Loan};
use crate::loans::amortization::outstanding_principal;
use crate::loans::advance_loans;
use crate::portfolio::returns::portfolio_return;
use crate::time_value::{fraction, future_value};
use crate::types::*;
use crate::HouseholdFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_include_post_retirement() -> bool {
    true
}

fn default_life_expectancy() -> u32 {
    83
}

/// Input for a multi-year projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub snapshot: HouseholdSnapshot,
    /// Requested pre-retirement horizon in years.
    pub years: u32,
    /// Overrides the snapshot's inflation rate when present.
    #[serde(default)]
    pub inflation_rate: Option<Percent>,
    #[serde(default = "default_include_post_retirement")]
    pub include_post_retirement: bool,
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy: u32,
}

/// Resolved knobs for [`simulate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    pub years: u32,
    pub inflation_rate: Percent,
    pub include_post_retirement: bool,
    pub life_expectancy: u32,
}

impl ProjectionOptions {
    /// Default options for a snapshot: its own inflation rate, post-retirement
    /// phase included, life expectancy 83.
    pub fn for_snapshot(snapshot: &HouseholdSnapshot, years: u32) -> Self {
        ProjectionOptions {
            years,
            inflation_rate: snapshot.inflation_rate,
            include_post_retirement: default_include_post_retirement(),
            life_expectancy: default_life_expectancy(),
        }
    }
}

impl From<&ProjectionInput> for ProjectionOptions {
    fn from(input: &ProjectionInput) -> Self {
        ProjectionOptions {
            years: input.years,
            inflation_rate: input
                .inflation_rate
                .unwrap_or(input.snapshot.inflation_rate),
            include_post_retirement: input.include_post_retirement,
            life_expectancy: input.life_expectancy,
        }
    }
}

/// One simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    pub year: u32,
    pub age: u32,
    pub salary: Money,
    pub annual_income: Money,
    pub annual_expense: Money,
    /// Income less living expense and debt service.
    pub annual_savings: Money,
    pub annual_investment: Money,
    pub total_annual_savings: Money,
    pub assets: Money,
    pub total_debt: Money,
    pub net_assets: Money,
    pub annual_debt_service: Money,
    pub principal_paid: Money,
    pub is_retired: bool,
}

/// Output of a projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub current_assets: Money,
    pub future_assets: Money,
    /// `future_assets - current_assets`
    pub total_savings: Money,
    pub yearly_records: Vec<YearlyRecord>,
    /// Requested horizon, not the number of simulated years.
    pub years: u32,
    /// Static annual return applied every pre-retirement year.
    pub portfolio_return: Percent,
    pub years_simulated: u32,
    pub retirement_reached: bool,
    pub depleted_at_age: Option<u32>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Run the year-by-year projection.
///
/// Pure: the snapshot is only read. Loan states are threaded through the
/// loop as fresh values each year. Money arithmetic saturates at the
/// `Decimal` range, so extreme horizons or rates yield bounded figures.
pub fn simulate(snapshot: &HouseholdSnapshot, options: &ProjectionOptions) -> ProjectionResult {
    let growth = Decimal::ONE + fraction(snapshot.salary_growth_rate);
    let asset_growth_rate = portfolio_return(&snapshot.assets);
    let asset_growth = Decimal::ONE + fraction(asset_growth_rate);
    let annual_investment = snapshot.monthly_recurring_investment() * MONTHS_PER_YEAR;
    let other_debt = snapshot.other_debt();
    let monthly_expense = snapshot.monthly_expense();

    let ytr = snapshot.years_to_retirement();
    let retirement_ahead = ytr > 0;
    let pre_years = if retirement_ahead {
        let ytr = u32::try_from(ytr).unwrap_or(u32::MAX);
        options.years.min(ytr)
    } else {
        options.years
    };

    debug!(
        "projection: {} pre-retirement years, portfolio return {}%, other debt {}",
        pre_years, asset_growth_rate, other_debt
    );

    let mut records: Vec<YearlyRecord> = Vec::new();
    let mut assets = snapshot.total_assets;
    let mut salary = snapshot.salary;
    let mut loans: Vec<Loan> = snapshot.loans.clone();
    let mut total_debt = snapshot.total_debt;

    // Pre-retirement accumulation
    for year in 1..=pre_years {
        salary = salary.saturating_mul(growth);
        let annual_income = salary.saturating_add(snapshot.bonus);
        let annual_expense = future_value(monthly_expense, i64::from(year), options.inflation_rate)
            .saturating_mul(MONTHS_PER_YEAR);

        let book = advance_loans(&loans);
        loans = book.loans;

        let annual_savings =
            annual_income.saturating_sub(annual_expense.saturating_add(book.debt_service));
        let total_annual_savings = annual_savings.saturating_add(annual_investment);

        assets = assets
            .saturating_mul(asset_growth)
            .saturating_add(total_annual_savings)
            .saturating_sub(book.balloon_payments);
        total_debt = outstanding_principal(&loans) + other_debt;

        trace!(
            "year {}: income {}, expense {}, debt service {}, assets {}",
            year,
            annual_income,
            annual_expense,
            book.debt_service,
            assets
        );

        records.push(YearlyRecord {
            year,
            age: snapshot.current_age + year,
            salary,
            annual_income,
            annual_expense,
            annual_savings,
            annual_investment,
            total_annual_savings,
            assets,
            total_debt,
            net_assets: assets.saturating_sub(total_debt),
            annual_debt_service: book.debt_service,
            principal_paid: book.principal_paid,
            is_retired: false,
        });
    }

    let retirement_reached = retirement_ahead && i64::from(pre_years) >= ytr;
    let mut depleted_at_age = None;

    // Post-retirement drawdown
    if options.include_post_retirement && retirement_reached {
        let base = snapshot.retirement_base_expense();
        let medical = snapshot.retirement_medical_expense;
        let years_after = options
            .life_expectancy
            .saturating_sub(snapshot.retirement_age);
        debug!(
            "projection: {} post-retirement years from age {}",
            years_after, snapshot.retirement_age
        );

        for j in 1..=years_after {
            let horizon = ytr + i64::from(j);
            let annual_expense = future_value(base, horizon, options.inflation_rate)
                .saturating_add(future_value(medical, horizon, options.inflation_rate))
                .saturating_mul(MONTHS_PER_YEAR);
            assets = assets.saturating_sub(annual_expense);

            let depleted = assets <= Decimal::ZERO;
            if depleted {
                assets = Decimal::ZERO;
            }
            let age = snapshot.retirement_age + j;

            records.push(YearlyRecord {
                year: pre_years + j,
                age,
                salary: Decimal::ZERO,
                annual_income: Decimal::ZERO,
                annual_expense,
                annual_savings: -annual_expense,
                annual_investment: Decimal::ZERO,
                total_annual_savings: -annual_expense,
                assets,
                total_debt,
                net_assets: assets.saturating_sub(total_debt),
                annual_debt_service: Decimal::ZERO,
                principal_paid: Decimal::ZERO,
                is_retired: true,
            });

            if depleted {
                debug!("projection: assets depleted at age {}", age);
                depleted_at_age = Some(age);
                break;
            }
        }
    }

    let years_simulated = u32::try_from(records.len()).unwrap_or(u32::MAX);
    ProjectionResult {
        current_assets: snapshot.total_assets,
        future_assets: assets,
        total_savings: assets.saturating_sub(snapshot.total_assets),
        yearly_records: records,
        years: options.years,
        portfolio_return: asset_growth_rate,
        years_simulated,
        retirement_reached,
        depleted_at_age,
    }
}

/// Project household assets forward, year by year, through retirement.
///
/// Rejects an inflation override outside -10..=20 and a life expectancy
/// above 150.
pub fn project_future_assets(
    input: &ProjectionInput,
) -> HouseholdFinanceResult<ComputationOutput<ProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(rate) = input.inflation_rate {
        validate_inflation_rate("inflation_rate", rate)?;
    }
    validate_life_expectancy(input.life_expectancy)?;

    let options = ProjectionOptions::from(input);
    let result = simulate(&input.snapshot, &options);

    if let Some(age) = result.depleted_at_age {
        warnings.push(format!("Portfolio exhausted at age {age}"));
    }
    let deficit_years = result
        .yearly_records
        .iter()
        .filter(|r| !r.is_retired && r.total_annual_savings < Decimal::ZERO)
        .count();
    if deficit_years > 0 {
        warnings.push(format!(
            "Spending exceeds income in {deficit_years} pre-retirement year(s)"
        ));
    }
    if input.include_post_retirement && !result.retirement_reached {
        warnings.push(format!(
            "Horizon of {} years ends before retirement; post-retirement phase not simulated",
            input.years
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deterministic yearly projection: salary growth, inflated expenses, loan amortization, static portfolio return, post-retirement drawdown",
        &serde_json::json!({
            "inflation_rate_pct": options.inflation_rate.to_string(),
            "salary_growth_rate_pct": input.snapshot.salary_growth_rate.to_string(),
            "portfolio_return_pct": result.portfolio_return.to_string(),
            "include_post_retirement": options.include_post_retirement,
            "life_expectancy": options.life_expectancy,
        }),
        warnings,
        elapsed,
        result,
    ))
}
