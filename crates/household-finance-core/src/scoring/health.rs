use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::household::HouseholdSnapshot;
use crate::types::*;
use crate::HouseholdFinanceResult;

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for HealthGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthGrade::APlus => "A+",
            HealthGrade::A => "A",
            HealthGrade::B => "B",
            HealthGrade::C => "C",
            HealthGrade::D => "D",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthOutput {
    pub grade: HealthGrade,
    /// Annual expense as a percentage of annual income.
    pub expense_ratio: Percent,
    /// Total debt as a percentage of total assets.
    pub debt_ratio: Percent,
    pub monthly_savings: Money,
    /// Months net assets cover current spending; `None` when spending is zero.
    pub emergency_fund_months: Option<Decimal>,
    pub annual_income: Money,
    pub annual_expense: Money,
    pub net_assets: Money,
}

/// Monthly income (salary and bonus spread over 12 months) less monthly spending.
pub fn monthly_savings(snapshot: &HouseholdSnapshot) -> Money {
    snapshot.annual_income() / MONTHS_PER_YEAR - snapshot.monthly_expense()
}

/// Spending as a percentage of income. No income with any spending counts as 100%.
pub(crate) fn expense_ratio(snapshot: &HouseholdSnapshot) -> Percent {
    let income = snapshot.annual_income();
    let expense = snapshot.monthly_expense() * MONTHS_PER_YEAR;
    if income > Decimal::ZERO {
        expense / income * HUNDRED
    } else if expense > Decimal::ZERO {
        HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Debt as a percentage of assets. Debt with no assets counts as 100%.
pub(crate) fn debt_ratio(snapshot: &HouseholdSnapshot) -> Percent {
    if snapshot.total_assets > Decimal::ZERO {
        snapshot.total_debt / snapshot.total_assets * HUNDRED
    } else if snapshot.total_debt > Decimal::ZERO {
        HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Months of current spending covered by net assets.
pub(crate) fn months_of_cover(net_assets: Money, monthly_expense: Money) -> Option<Decimal> {
    if monthly_expense > Decimal::ZERO {
        Some(net_assets / monthly_expense)
    } else {
        None
    }
}

/// Unbounded cover (no spending) counts as zero months here, so a household
/// with no recorded spending tops out at C.
fn covers(months: Option<Decimal>, threshold: Decimal) -> bool {
    months.is_some_and(|m| m >= threshold)
}

fn grade(expense_ratio: Percent, months: Option<Decimal>, debt_ratio: Percent, debt: Money) -> HealthGrade {
    if expense_ratio < dec!(50) && covers(months, dec!(6)) && debt.is_zero() {
        HealthGrade::APlus
    } else if expense_ratio < dec!(60) && covers(months, dec!(3)) && debt_ratio < dec!(20) {
        HealthGrade::A
    } else if expense_ratio < dec!(70) && covers(months, Decimal::ONE) && debt_ratio < dec!(40) {
        HealthGrade::B
    } else if expense_ratio < dec!(80) && debt_ratio < dec!(60) {
        HealthGrade::C
    } else {
        HealthGrade::D
    }
}

/// Grade household finances A+ through D on spending, emergency cover and
/// leverage.
///
/// | Grade | Expense ratio | Emergency fund | Debt ratio |
/// |-------|---------------|----------------|------------|
/// | A+    | < 50%         | >= 6 months    | no debt    |
/// | A     | < 60%         | >= 3 months    | < 20%      |
/// | B     | < 70%         | >= 1 month     | < 40%      |
/// | C     | < 80%         | any            | < 60%      |
/// | D     | otherwise     |                |            |
pub fn financial_health_grade(
    snapshot: &HouseholdSnapshot,
) -> HouseholdFinanceResult<ComputationOutput<HealthOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let expense_ratio = expense_ratio(snapshot);
    let debt_ratio = debt_ratio(snapshot);
    let net_assets = snapshot.net_assets();
    let emergency_fund_months = months_of_cover(net_assets, snapshot.monthly_expense());
    let grade = grade(
        expense_ratio,
        emergency_fund_months,
        debt_ratio,
        snapshot.total_debt,
    );

    if snapshot.annual_income().is_zero() {
        warnings.push("No income recorded; expense ratio taken as 100%".into());
    }

    let output = HealthOutput {
        grade,
        expense_ratio,
        debt_ratio,
        monthly_savings: monthly_savings(snapshot),
        emergency_fund_months,
        annual_income: snapshot.annual_income(),
        annual_expense: snapshot.monthly_expense() * MONTHS_PER_YEAR,
        net_assets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rule-based grade from expense ratio, emergency-fund months and debt ratio",
        &serde_json::json!({
            "grade_thresholds": "A+ <50%/6m/no debt, A <60%/3m/<20%, B <70%/1m/<40%, C <80%/-/<60%",
        }),
        warnings,
        elapsed,
        output,
    ))
}
