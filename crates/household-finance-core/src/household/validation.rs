//! Input checks run before a snapshot reaches the engine.
//!
//! The projection and goal modules assume a snapshot that has passed
//! [`validate_snapshot`]; they do not re-check ranges themselves.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::snapshot::{Asset, HouseholdSnapshot};
use crate::error::HouseholdFinanceError;
use crate::HouseholdFinanceResult;

const MAX_AGE: u32 = 150;
const MAX_RETIREMENT_AGE: u32 = 100;
const MAX_SALARY: Decimal = dec!(1_000_000);
const MAX_SALARY_GROWTH: Decimal = dec!(20);
const MIN_INFLATION: Decimal = dec!(-10);
const MAX_INFLATION: Decimal = dec!(20);

fn non_negative(field: &str, value: Decimal) -> HouseholdFinanceResult<()> {
    if value < Decimal::ZERO {
        return Err(HouseholdFinanceError::invalid(field, "must be >= 0"));
    }
    Ok(())
}

/// Inflation must lie within -10..=20 percent a year.
pub fn validate_inflation_rate(field: &str, rate: Decimal) -> HouseholdFinanceResult<()> {
    if rate < MIN_INFLATION || rate > MAX_INFLATION {
        return Err(HouseholdFinanceError::invalid(
            field,
            format!("must be between {MIN_INFLATION} and {MAX_INFLATION}"),
        ));
    }
    Ok(())
}

/// Life expectancy shares the age ceiling. At or below the retirement age it
/// simply leaves no post-retirement years.
pub fn validate_life_expectancy(life_expectancy: u32) -> HouseholdFinanceResult<()> {
    if life_expectancy > MAX_AGE {
        return Err(HouseholdFinanceError::invalid(
            "life_expectancy",
            format!("must be <= {MAX_AGE}"),
        ));
    }
    Ok(())
}

/// Reject snapshots the engine cannot meaningfully project.
pub fn validate_snapshot(snapshot: &HouseholdSnapshot) -> HouseholdFinanceResult<()> {
    if snapshot.current_age > MAX_AGE {
        return Err(HouseholdFinanceError::invalid(
            "current_age",
            format!("must be <= {MAX_AGE}"),
        ));
    }
    if snapshot.retirement_age <= snapshot.current_age {
        return Err(HouseholdFinanceError::invalid(
            "retirement_age",
            "retirement_age must be > current_age",
        ));
    }
    if snapshot.retirement_age > MAX_RETIREMENT_AGE {
        return Err(HouseholdFinanceError::invalid(
            "retirement_age",
            format!("must be <= {MAX_RETIREMENT_AGE}"),
        ));
    }

    non_negative("salary", snapshot.salary)?;
    if snapshot.salary > MAX_SALARY {
        return Err(HouseholdFinanceError::invalid(
            "salary",
            format!("must be <= {MAX_SALARY}"),
        ));
    }
    non_negative("salary_growth_rate", snapshot.salary_growth_rate)?;
    if snapshot.salary_growth_rate > MAX_SALARY_GROWTH {
        return Err(HouseholdFinanceError::invalid(
            "salary_growth_rate",
            format!("must be <= {MAX_SALARY_GROWTH}"),
        ));
    }

    validate_inflation_rate("inflation_rate", snapshot.inflation_rate)?;

    non_negative("bonus", snapshot.bonus)?;
    non_negative("monthly_fixed_expense", snapshot.monthly_fixed_expense)?;
    non_negative("monthly_variable_expense", snapshot.monthly_variable_expense)?;
    non_negative("total_assets", snapshot.total_assets)?;
    non_negative("total_debt", snapshot.total_debt)?;
    non_negative(
        "retirement_monthly_expense",
        snapshot.retirement_monthly_expense,
    )?;
    non_negative(
        "retirement_medical_expense",
        snapshot.retirement_medical_expense,
    )?;
    if snapshot.withdrawal_rate <= Decimal::ZERO {
        return Err(HouseholdFinanceError::invalid(
            "withdrawal_rate",
            "must be > 0",
        ));
    }

    for (i, loan) in snapshot.loans.iter().enumerate() {
        non_negative(&format!("loans[{i}].principal"), loan.principal)?;
        non_negative(&format!("loans[{i}].annual_rate"), loan.annual_rate)?;
        if let Some(payment) = loan.monthly_payment {
            non_negative(&format!("loans[{i}].monthly_payment"), payment)?;
        }
    }

    for (i, asset) in snapshot.assets.iter().enumerate() {
        let (field, value) = match asset {
            Asset::Deposit { principal, .. } => ("principal", *principal),
            Asset::RecurringSavings { monthly_amount, .. } => ("monthly_amount", *monthly_amount),
            Asset::RealEstate { market_value } => ("market_value", *market_value),
            Asset::Equity { amount, .. } => ("amount", *amount),
        };
        non_negative(&format!("assets[{i}].{field}"), value)?;
    }

    for (i, inv) in snapshot.recurring_investments.iter().enumerate() {
        non_negative(
            &format!("recurring_investments[{i}].monthly_amount"),
            inv.monthly_amount,
        )?;
    }

    Ok(())
}

/// Soft inconsistencies that do not block a projection.
pub fn consistency_warnings(snapshot: &HouseholdSnapshot) -> Vec<String> {
    let mut warnings = Vec::new();

    let monthly_salary = snapshot.salary / dec!(12);
    if snapshot.monthly_expense() > monthly_salary {
        warnings.push(format!(
            "Monthly expense {} exceeds monthly salary {}",
            snapshot.monthly_expense(),
            monthly_salary.round_dp(2)
        ));
    }
    if snapshot.total_debt > snapshot.total_assets {
        warnings.push(format!(
            "Total debt {} exceeds total assets {}",
            snapshot.total_debt, snapshot.total_assets
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_snapshot() -> HouseholdSnapshot {
        HouseholdSnapshot::from_json(
            r#"{"current_age": 30, "retirement_age": 60, "salary": 5000,
                "monthly_fixed_expense": 120, "monthly_variable_expense": 80,
                "total_assets": 1000}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_snapshot_passes() {
        assert!(validate_snapshot(&valid_snapshot()).is_ok());
        assert!(consistency_warnings(&valid_snapshot()).is_empty());
    }

    #[test]
    fn test_retirement_age_must_be_ahead() {
        let mut snap = valid_snapshot();
        snap.retirement_age = 30;
        match validate_snapshot(&snap).unwrap_err() {
            HouseholdFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "retirement_age")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_money_rejected() {
        let mut snap = valid_snapshot();
        snap.total_debt = dec!(-1);
        assert!(validate_snapshot(&snap).is_err());
    }

    #[test]
    fn test_salary_growth_upper_bound() {
        let mut snap = valid_snapshot();
        snap.salary_growth_rate = dec!(25);
        assert!(validate_snapshot(&snap).is_err());
    }

    #[test]
    fn test_inflation_rate_bounds() {
        let mut snap = valid_snapshot();
        snap.inflation_rate = dec!(-2);
        assert!(validate_snapshot(&snap).is_ok());
        snap.inflation_rate = dec!(50);
        match validate_snapshot(&snap).unwrap_err() {
            HouseholdFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "inflation_rate")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_life_expectancy_ceiling() {
        assert!(validate_life_expectancy(83).is_ok());
        assert!(validate_life_expectancy(150).is_ok());
        assert!(validate_life_expectancy(3000).is_err());
    }

    #[test]
    fn test_warnings_for_overspending_and_leverage() {
        let mut snap = valid_snapshot();
        snap.monthly_variable_expense = dec!(500);
        snap.total_debt = dec!(2000);
        let warnings = consistency_warnings(&snap);
        assert_eq!(warnings.len(), 2);
    }
}
