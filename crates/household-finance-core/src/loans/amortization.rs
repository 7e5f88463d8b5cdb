use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::household::{Loan, RepaymentType};
use crate::time_value::{level_payment, monthly_rate};
use crate::types::Money;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One loan's flows for a single simulated year, plus its next state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanYear {
    /// Loan state at the end of the year.
    pub loan: Loan,
    pub months_processed: u32,
    /// Scheduled cash paid out this year (interest plus scheduled principal).
    pub debt_service: Money,
    /// Principal retired this year, including any balloon settlement.
    pub principal_paid: Money,
    /// Lump sum settled from household assets at maturity.
    pub balloon_payment: Money,
    /// False once the loan has matured or been fully repaid.
    pub active: bool,
}

/// Aggregate flows of the whole loan book for one simulated year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanBookYear {
    /// Loans still outstanding after the year, in their original order.
    pub loans: Vec<Loan>,
    pub debt_service: Money,
    pub principal_paid: Money,
    pub balloon_payments: Money,
    pub retired: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monthly payment the loan would require at its current state.
///
/// Interest-only types fall back to `P * r / 12`, equal-instalment loans to
/// the level payment over the remaining term. Declining-balance loans report
/// the first month's payment.
pub fn current_monthly_payment(loan: &Loan) -> Money {
    let i = monthly_rate(loan.annual_rate);
    match loan.effective_repayment() {
        RepaymentType::DepositReturn | RepaymentType::InterestOnlyBalloon => loan
            .declared_payment()
            .unwrap_or(loan.principal * i),
        RepaymentType::EqualInstallment => loan
            .declared_payment()
            .unwrap_or_else(|| level_payment(loan.principal, i, loan.remaining_months)),
        RepaymentType::DecliningBalance => {
            if loan.remaining_months == 0 {
                Decimal::ZERO
            } else {
                loan.principal / Decimal::from(loan.remaining_months) + loan.principal * i
            }
        }
        RepaymentType::Other => loan.declared_payment().unwrap_or(Decimal::ZERO),
    }
}

/// Sum of outstanding principal across a loan book.
pub fn outstanding_principal(loans: &[Loan]) -> Money {
    loans.iter().map(|l| l.principal).sum()
}

fn is_amortizing(kind: RepaymentType) -> bool {
    matches!(
        kind,
        RepaymentType::EqualInstallment | RepaymentType::DecliningBalance
    )
}

// ---------------------------------------------------------------------------
// Per-type schedules
// ---------------------------------------------------------------------------

struct Flows {
    principal: Money,
    months_run: u32,
    debt_service: Money,
    principal_paid: Money,
    balloon: Money,
}

fn interest_only(loan: &Loan, months: u32, settle_at_maturity: bool) -> Flows {
    let payment = current_monthly_payment(loan);
    let matures = months == loan.remaining_months;
    let balloon = if settle_at_maturity && matures {
        loan.principal
    } else {
        Decimal::ZERO
    };
    Flows {
        principal: loan.principal - balloon,
        months_run: months,
        debt_service: payment * Decimal::from(months),
        principal_paid: balloon,
        balloon,
    }
}

fn equal_installment(loan: &Loan, months: u32) -> Flows {
    let i = monthly_rate(loan.annual_rate);
    let payment = current_monthly_payment(loan);
    let mut principal = loan.principal;
    let mut debt_service = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;
    let mut months_run = 0;

    for m in 0..months {
        if principal <= Decimal::ZERO {
            break;
        }
        let interest = principal * i;
        let last_month = loan.remaining_months - m == 1;
        // Residual principal on the final instalment is folded into that payment.
        let principal_part = if last_month {
            principal
        } else {
            (payment - interest).max(Decimal::ZERO).min(principal)
        };
        principal -= principal_part;
        principal_paid += principal_part;
        debt_service += interest + principal_part;
        months_run += 1;
    }

    Flows {
        principal,
        months_run,
        debt_service,
        principal_paid,
        balloon: Decimal::ZERO,
    }
}

fn declining_balance(loan: &Loan, months: u32) -> Flows {
    let i = monthly_rate(loan.annual_rate);
    let mut principal = loan.principal;
    let mut debt_service = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;
    let mut months_run = 0;

    for m in 0..months {
        if principal <= Decimal::ZERO {
            break;
        }
        let months_left = loan.remaining_months - m;
        let principal_part = (principal / Decimal::from(months_left)).min(principal);
        let interest = principal * i;
        principal -= principal_part;
        principal_paid += principal_part;
        debt_service += principal_part + interest;
        months_run += 1;
    }

    Flows {
        principal,
        months_run,
        debt_service,
        principal_paid,
        balloon: Decimal::ZERO,
    }
}

fn stated_payment_only(loan: &Loan, months: u32) -> Flows {
    Flows {
        principal: loan.principal,
        months_run: months,
        debt_service: current_monthly_payment(loan) * Decimal::from(months),
        principal_paid: Decimal::ZERO,
        balloon: Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Advance one loan by one simulated year (at most 12 months).
///
/// Pure: the input loan is untouched and the next state is returned inside
/// the [`LoanYear`]. A loan with no months left is skipped and reported
/// inactive.
pub fn advance_year(loan: &Loan) -> LoanYear {
    if loan.remaining_months == 0 {
        return LoanYear {
            loan: loan.clone(),
            months_processed: 0,
            debt_service: Decimal::ZERO,
            principal_paid: Decimal::ZERO,
            balloon_payment: Decimal::ZERO,
            active: false,
        };
    }

    let kind = loan.effective_repayment();
    let months = loan.remaining_months.min(MONTHS_PER_YEAR);

    let flows = match kind {
        RepaymentType::DepositReturn => interest_only(loan, months, false),
        RepaymentType::InterestOnlyBalloon => interest_only(loan, months, true),
        RepaymentType::EqualInstallment => equal_installment(loan, months),
        RepaymentType::DecliningBalance => declining_balance(loan, months),
        RepaymentType::Other => stated_payment_only(loan, months),
    };

    let remaining_months = loan.remaining_months - flows.months_run;
    let principal = flows.principal.max(Decimal::ZERO);
    let paid_off = is_amortizing(kind) && principal.is_zero();
    let active = remaining_months > 0 && !paid_off;

    trace!(
        "loan {:?} ({:?}): {} months, service {}, principal paid {}, balloon {}, {} months left",
        loan.name,
        kind,
        flows.months_run,
        flows.debt_service,
        flows.principal_paid,
        flows.balloon,
        remaining_months
    );

    LoanYear {
        loan: Loan {
            principal,
            remaining_months,
            ..loan.clone()
        },
        months_processed: flows.months_run,
        debt_service: flows.debt_service,
        principal_paid: flows.principal_paid,
        balloon_payment: flows.balloon,
        active,
    }
}

/// Advance every loan in the book by one year and compact the survivors.
///
/// Loans are processed in order; retired loans are dropped in a single pass
/// afterwards so the relative order of the remaining loans is preserved.
pub fn advance_loans(loans: &[Loan]) -> LoanBookYear {
    let years: Vec<LoanYear> = loans.iter().map(advance_year).collect();

    let debt_service = years.iter().map(|y| y.debt_service).sum();
    let principal_paid = years.iter().map(|y| y.principal_paid).sum();
    let balloon_payments = years.iter().map(|y| y.balloon_payment).sum();
    let retired = years.iter().filter(|y| !y.active).count();

    let survivors = years
        .into_iter()
        .filter(|y| y.active)
        .map(|y| y.loan)
        .collect();

    LoanBookYear {
        loans: survivors,
        debt_service,
        principal_paid,
        balloon_payments,
        retired,
    }
}
