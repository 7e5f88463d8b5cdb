use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

/// How a loan's principal is retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentType {
    /// Interest-only payments, full principal due as a lump sum at maturity.
    InterestOnlyBalloon,
    /// Principal settled by a refundable deposit held by a third party.
    DepositReturn,
    /// Fixed monthly payment; the principal/interest split shifts over time.
    EqualInstallment,
    /// Equal principal pieces each month; total payment shrinks.
    DecliningBalance,
    /// Stated payment only, principal not tracked.
    Other,
}

/// A single loan in the household's debt book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Outstanding balance.
    pub principal: Money,
    pub annual_rate: Percent,
    pub repayment_type: RepaymentType,
    /// Declared monthly payment. Derived from the schedule when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    pub remaining_months: u32,
    #[serde(default)]
    pub total_months: u32,
    #[serde(default)]
    pub is_deposit_return: bool,
}

impl Loan {
    /// Repayment semantics after applying the deposit-return flag.
    pub fn effective_repayment(&self) -> RepaymentType {
        if self.is_deposit_return {
            RepaymentType::DepositReturn
        } else {
            self.repayment_type
        }
    }

    /// Declared payment, ignoring non-positive placeholders.
    pub fn declared_payment(&self) -> Option<Money> {
        self.monthly_payment.filter(|p| *p > Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// A portfolio holding. Each variant carries its own return-generating rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    /// Lump-sum deposit held to maturity.
    Deposit {
        principal: Money,
        months: u32,
        annual_rate: Percent,
        #[serde(default)]
        compound: bool,
    },
    /// Fixed monthly instalment savings account.
    RecurringSavings {
        monthly_amount: Money,
        months: u32,
        annual_rate: Percent,
        #[serde(default)]
        compound: bool,
    },
    RealEstate { market_value: Money },
    Equity { amount: Money, return_rate: Percent },
}

/// A standing monthly contribution into investments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringInvestment {
    #[serde(default)]
    pub name: String,
    pub monthly_amount: Money,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

fn default_retirement_age() -> u32 {
    60
}

fn default_salary_growth_rate() -> Percent {
    dec!(3.0)
}

fn default_inflation_rate() -> Percent {
    dec!(2.5)
}

fn default_withdrawal_rate() -> Percent {
    dec!(4.0)
}

fn default_retirement_expense_ratio() -> Percent {
    dec!(80.0)
}

/// Point-in-time view of a household's finances. Salary and bonus are annual;
/// expenses are monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdSnapshot {
    pub current_age: u32,
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u32,
    pub salary: Money,
    #[serde(default = "default_salary_growth_rate")]
    pub salary_growth_rate: Percent,
    #[serde(default)]
    pub bonus: Money,
    #[serde(default)]
    pub monthly_fixed_expense: Money,
    #[serde(default)]
    pub monthly_variable_expense: Money,
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: Percent,
    #[serde(default)]
    pub total_assets: Money,
    #[serde(default)]
    pub total_debt: Money,
    #[serde(default)]
    pub retirement_monthly_expense: Money,
    #[serde(default)]
    pub retirement_medical_expense: Money,
    /// Share of today's spending kept in retirement when no explicit
    /// retirement budget is given.
    #[serde(default = "default_retirement_expense_ratio")]
    pub retirement_expense_ratio: Percent,
    #[serde(default = "default_withdrawal_rate")]
    pub withdrawal_rate: Percent,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub recurring_investments: Vec<RecurringInvestment>,
}

impl HouseholdSnapshot {
    pub fn from_json(json: &str) -> HouseholdFinanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn monthly_expense(&self) -> Money {
        self.monthly_fixed_expense + self.monthly_variable_expense
    }

    pub fn annual_income(&self) -> Money {
        self.salary + self.bonus
    }

    pub fn net_assets(&self) -> Money {
        self.total_assets - self.total_debt
    }

    /// Signed so that a retirement age at or behind the current age is visible.
    pub fn years_to_retirement(&self) -> i64 {
        i64::from(self.retirement_age) - i64::from(self.current_age)
    }

    /// Monthly retirement living cost in today's money, before medical costs.
    pub fn retirement_base_expense(&self) -> Money {
        if self.retirement_monthly_expense > Decimal::ZERO {
            self.retirement_monthly_expense
        } else {
            self.monthly_expense() * self.retirement_expense_ratio / dec!(100)
        }
    }

    pub fn monthly_recurring_investment(&self) -> Money {
        self.recurring_investments
            .iter()
            .map(|r| r.monthly_amount)
            .sum()
    }

    /// Debt not represented by an itemized loan.
    pub fn other_debt(&self) -> Money {
        let itemized: Money = self.loans.iter().map(|l| l.principal).sum();
        (self.total_debt - itemized).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_applies_defaults() {
        let json = r#"{
            "current_age": 30,
            "salary": "5000",
            "monthly_fixed_expense": "120",
            "monthly_variable_expense": "80"
        }"#;
        let snap = HouseholdSnapshot::from_json(json).unwrap();
        assert_eq!(snap.retirement_age, 60);
        assert_eq!(snap.salary_growth_rate, dec!(3.0));
        assert_eq!(snap.inflation_rate, dec!(2.5));
        assert_eq!(snap.withdrawal_rate, dec!(4.0));
        assert!(snap.loans.is_empty());
        assert_eq!(snap.monthly_expense(), dec!(200));
    }

    #[test]
    fn test_deserialize_tagged_assets_and_loans() {
        let json = r#"{
            "current_age": 40,
            "salary": 7000,
            "assets": [
                {"type": "deposit", "principal": 1000, "months": 12, "annual_rate": 3.5, "compound": true},
                {"type": "real_estate", "market_value": 30000}
            ],
            "loans": [
                {"principal": 2000, "annual_rate": 4.2, "repayment_type": "equal_installment", "remaining_months": 120}
            ]
        }"#;
        let snap = HouseholdSnapshot::from_json(json).unwrap();
        assert_eq!(snap.assets.len(), 2);
        assert!(matches!(snap.assets[1], Asset::RealEstate { .. }));
        assert_eq!(
            snap.loans[0].effective_repayment(),
            RepaymentType::EqualInstallment
        );
        assert_eq!(snap.loans[0].monthly_payment, None);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = HouseholdSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(
            err,
            crate::HouseholdFinanceError::SerializationError(_)
        ));
    }

    #[test]
    fn test_deposit_flag_overrides_type() {
        let loan = Loan {
            name: None,
            principal: dec!(10_000),
            annual_rate: dec!(3),
            repayment_type: RepaymentType::InterestOnlyBalloon,
            monthly_payment: None,
            remaining_months: 24,
            total_months: 24,
            is_deposit_return: true,
        };
        assert_eq!(loan.effective_repayment(), RepaymentType::DepositReturn);
    }

    #[test]
    fn test_retirement_base_expense_falls_back_to_ratio() {
        let json = r#"{"current_age": 30, "salary": 5000, "monthly_fixed_expense": 150, "monthly_variable_expense": 50}"#;
        let snap = HouseholdSnapshot::from_json(json).unwrap();
        assert_eq!(snap.retirement_base_expense(), dec!(160));
    }

    #[test]
    fn test_other_debt_residual() {
        let json = r#"{
            "current_age": 30, "salary": 5000, "total_debt": 3000,
            "loans": [{"principal": 2000, "annual_rate": 4, "repayment_type": "other", "remaining_months": 12}]
        }"#;
        let snap = HouseholdSnapshot::from_json(json).unwrap();
        assert_eq!(snap.other_debt(), dec!(1000));
    }
}
