use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::time_value::{compound, fraction};
use crate::types::{Money, Percent};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Maturity value of a lump-sum deposit held for `months`.
///
/// Simple interest: `P + P * r * m / 12`. Compound: `P * (1 + r/12)^m`.
/// A non-positive principal, rate, or zero term returns the principal.
pub fn deposit_maturity_value(
    principal: Money,
    months: u32,
    annual_rate: Percent,
    compound_interest: bool,
) -> Money {
    if principal <= Decimal::ZERO {
        return principal.max(Decimal::ZERO);
    }
    if months == 0 || annual_rate <= Decimal::ZERO {
        return principal;
    }

    let r = fraction(annual_rate);
    if compound_interest {
        principal * compound(r / MONTHS_PER_YEAR, months)
    } else {
        principal + principal * r * Decimal::from(months) / MONTHS_PER_YEAR
    }
}

/// Maturity value of an instalment savings account with a deposit at the
/// start of every month.
///
/// The i-th most recent deposit earns interest for i months, so simple
/// interest sums to `M * r/12 * n(n+1)/2`; compound interest is the
/// annuity-due closed form `M * (1+i) * ((1+i)^n - 1) / i`.
pub fn recurring_savings_maturity_value(
    monthly_amount: Money,
    months: u32,
    annual_rate: Percent,
    compound_interest: bool,
) -> Money {
    if monthly_amount <= Decimal::ZERO || months == 0 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(months);
    let contributed = monthly_amount * n;
    if annual_rate <= Decimal::ZERO {
        return contributed;
    }

    let i = fraction(annual_rate) / MONTHS_PER_YEAR;
    if compound_interest {
        monthly_amount * (Decimal::ONE + i) * (compound(i, months) - Decimal::ONE) / i
    } else {
        let installment_months = n * (n + Decimal::ONE) / dec!(2);
        contributed + monthly_amount * i * installment_months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deposit_simple_interest() {
        // 1000 at 6% for 12 months simple -> 1060
        assert_eq!(
            deposit_maturity_value(dec!(1000), 12, dec!(6), false),
            dec!(1060)
        );
    }

    #[test]
    fn test_deposit_compound_interest() {
        // 1000 * 1.005^12 = 1061.6778...
        let v = deposit_maturity_value(dec!(1000), 12, dec!(6), true);
        assert!((v - dec!(1061.6778)).abs() < dec!(0.0001), "v={}", v);
    }

    #[test]
    fn test_deposit_degenerate_inputs() {
        assert_eq!(deposit_maturity_value(dec!(1000), 0, dec!(6), true), dec!(1000));
        assert_eq!(deposit_maturity_value(dec!(1000), 12, dec!(0), true), dec!(1000));
        assert_eq!(deposit_maturity_value(dec!(-5), 12, dec!(6), true), dec!(0));
    }

    #[test]
    fn test_savings_simple_interest_arithmetic_series() {
        // 100/month, 12 months, 6%: interest = 100 * 0.005 * 78 = 39
        assert_eq!(
            recurring_savings_maturity_value(dec!(100), 12, dec!(6), false),
            dec!(1239)
        );
    }

    #[test]
    fn test_savings_compound_matches_month_by_month() {
        let monthly = dec!(100);
        let i = dec!(0.005);
        let mut balance = Decimal::ZERO;
        for _ in 0..12 {
            balance = (balance + monthly) * (Decimal::ONE + i);
        }
        let closed = recurring_savings_maturity_value(monthly, 12, dec!(6), true);
        assert!((closed - balance).abs() < dec!(0.000001), "closed={} loop={}", closed, balance);
    }

    #[test]
    fn test_savings_degenerate_inputs() {
        assert_eq!(recurring_savings_maturity_value(dec!(100), 12, dec!(0), true), dec!(1200));
        assert_eq!(recurring_savings_maturity_value(dec!(0), 12, dec!(5), true), dec!(0));
        assert_eq!(recurring_savings_maturity_value(dec!(100), 0, dec!(5), false), dec!(0));
    }
}
