use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::household::HouseholdSnapshot;
use crate::projection::{simulate, ProjectionOptions};
use crate::time_value::future_value;
use crate::types::*;
use crate::HouseholdFinanceResult;

/// Retirement length the savings are measured against.
pub const RETIREMENT_HORIZON_YEARS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SustainabilityStatus {
    /// Savings last the full horizon.
    Sustainable,
    /// Savings last at least half the horizon.
    Warning,
    Danger,
    /// Retirement age is not after the current age.
    InvalidHorizon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SustainabilityOutput {
    pub years_to_retirement: u32,
    pub expected_assets_at_retirement: Money,
    /// Living plus medical cost per month, inflated to the retirement year.
    pub monthly_expense_at_retirement: Money,
    /// `None` when retirement spending is zero (savings never run out).
    pub survival_months: Option<Decimal>,
    pub survival_years: Option<Decimal>,
    pub horizon_years: u32,
    pub is_sustainable: bool,
    pub status: SustainabilityStatus,
}

/// How long projected retirement savings cover retirement spending, measured
/// against a 20-year retirement.
///
/// Assets at retirement come from the accumulation phase of the projection
/// (no drawdown). Spending is the retirement budget plus medical costs, both
/// inflated to the retirement year; no growth is assumed after retirement.
pub fn assess_retirement_sustainability(
    snapshot: &HouseholdSnapshot,
) -> HouseholdFinanceResult<ComputationOutput<SustainabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = sustainability(snapshot);
    if output.status == SustainabilityStatus::InvalidHorizon {
        warnings.push("Retirement age is not after current age".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Assets at retirement divided by inflated monthly retirement spending",
        &serde_json::json!({
            "horizon_years": RETIREMENT_HORIZON_YEARS,
            "inflation_rate_pct": snapshot.inflation_rate.to_string(),
            "post_retirement_growth": "none",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// [`assess_retirement_sustainability`] without the output envelope.
pub fn sustainability(snapshot: &HouseholdSnapshot) -> SustainabilityOutput {
    let ytr = snapshot.years_to_retirement();
    if ytr <= 0 {
        return SustainabilityOutput {
            years_to_retirement: 0,
            expected_assets_at_retirement: Decimal::ZERO,
            monthly_expense_at_retirement: Decimal::ZERO,
            survival_months: Some(Decimal::ZERO),
            survival_years: Some(Decimal::ZERO),
            horizon_years: RETIREMENT_HORIZON_YEARS,
            is_sustainable: false,
            status: SustainabilityStatus::InvalidHorizon,
        };
    }
    let years = u32::try_from(ytr).unwrap_or(u32::MAX);

    let mut options = ProjectionOptions::for_snapshot(snapshot, years);
    options.include_post_retirement = false;
    let assets = simulate(snapshot, &options).future_assets;

    let monthly_expense = future_value(snapshot.retirement_base_expense(), ytr, snapshot.inflation_rate)
        + future_value(snapshot.retirement_medical_expense, ytr, snapshot.inflation_rate);

    let (survival_months, survival_years) = if monthly_expense > Decimal::ZERO {
        let months = assets / monthly_expense;
        (Some(months), Some(months / dec!(12)))
    } else {
        (None, None)
    };

    let horizon = Decimal::from(RETIREMENT_HORIZON_YEARS);
    let (is_sustainable, status) = match survival_years {
        None => (true, SustainabilityStatus::Sustainable),
        Some(y) if y >= horizon => (true, SustainabilityStatus::Sustainable),
        Some(y) if y >= horizon / dec!(2) => (false, SustainabilityStatus::Warning),
        Some(_) => (false, SustainabilityStatus::Danger),
    };

    SustainabilityOutput {
        years_to_retirement: years,
        expected_assets_at_retirement: assets,
        monthly_expense_at_retirement: monthly_expense,
        survival_months,
        survival_years,
        horizon_years: RETIREMENT_HORIZON_YEARS,
        is_sustainable,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(json: &str) -> HouseholdSnapshot {
        HouseholdSnapshot::from_json(json).unwrap()
    }

    #[test]
    fn test_invalid_horizon() {
        let snap = snapshot(r#"{"current_age": 61, "retirement_age": 60, "salary": 1000}"#);
        let out = assess_retirement_sustainability(&snap).unwrap();
        assert_eq!(out.result.status, SustainabilityStatus::InvalidHorizon);
        assert!(!out.result.is_sustainable);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_spending_is_sustainable() {
        let snap = snapshot(r#"{"current_age": 50, "retirement_age": 55, "salary": 1000}"#);
        let out = sustainability(&snap);
        assert_eq!(out.survival_months, None);
        assert_eq!(out.status, SustainabilityStatus::Sustainable);
    }

    #[test]
    fn test_wealthy_household_sustainable() {
        let snap = snapshot(
            r#"{"current_age": 55, "retirement_age": 60, "salary": 10000,
                "monthly_fixed_expense": 100, "total_assets": 500000,
                "retirement_monthly_expense": 100, "inflation_rate": 0}"#,
        );
        let out = sustainability(&snap);
        assert_eq!(out.monthly_expense_at_retirement, dec!(100));
        assert!(out.survival_years.unwrap() >= dec!(20));
        assert!(out.is_sustainable);
    }

    #[test]
    fn test_thin_savings_danger() {
        let snap = snapshot(
            r#"{"current_age": 59, "retirement_age": 60, "salary": 0,
                "salary_growth_rate": 0, "total_assets": 1200,
                "retirement_monthly_expense": 100, "inflation_rate": 0}"#,
        );
        let out = sustainability(&snap);
        assert_eq!(out.expected_assets_at_retirement, dec!(1200));
        assert_eq!(out.survival_months, Some(dec!(12)));
        assert_eq!(out.status, SustainabilityStatus::Danger);
    }
}
