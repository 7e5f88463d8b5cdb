use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent};

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert a percentage-point rate into a fraction (2.5 -> 0.025).
pub fn fraction(rate: Percent) -> Decimal {
    rate / HUNDRED
}

/// Monthly periodic rate for an annual percentage rate (6 -> 0.005).
pub fn monthly_rate(annual_rate: Percent) -> Decimal {
    annual_rate / HUNDRED / MONTHS_PER_YEAR
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn compound(rate: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.saturating_mul(factor);
        if result == Decimal::MAX || result == Decimal::MIN || result.is_zero() {
            break;
        }
    }
    result
}

/// Grow `value` by `rate` percent per year for `years` years.
///
/// Zero or negative horizons return the value unchanged.
pub fn future_value(value: Money, years: i64, rate: Percent) -> Money {
    if years <= 0 {
        return value;
    }
    let n = u32::try_from(years).unwrap_or(u32::MAX);
    value.saturating_mul(compound(fraction(rate), n))
}

/// Future value of 1 paid at the end of each of `n` periods: ((1+i)^n - 1) / i.
///
/// Degenerates to `n` when the periodic rate is zero.
pub fn annuity_fv_factor(periodic_rate: Decimal, n: u32) -> Decimal {
    if periodic_rate.is_zero() {
        return Decimal::from(n);
    }
    (compound(periodic_rate, n) - Decimal::ONE)
        .checked_div(periodic_rate)
        .unwrap_or(Decimal::MAX)
}

/// Level payment that retires `principal` over `n` periods at `periodic_rate`.
pub fn level_payment(principal: Money, periodic_rate: Decimal, n: u32) -> Money {
    if n == 0 || principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if periodic_rate <= Decimal::ZERO {
        return principal / Decimal::from(n);
    }
    let growth = compound(periodic_rate, n);
    (principal * periodic_rate).saturating_mul(growth) / (growth - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_future_value_one_year() {
        assert_eq!(future_value(dec!(200), 1, dec!(2.5)), dec!(205));
    }

    #[test]
    fn test_future_value_identity_for_non_positive_years() {
        assert_eq!(future_value(dec!(200), 0, dec!(2.5)), dec!(200));
        assert_eq!(future_value(dec!(200), -3, dec!(2.5)), dec!(200));
    }

    #[test]
    fn test_future_value_compounds() {
        // 100 * 1.1^2 = 121
        assert_eq!(future_value(dec!(100), 2, dec!(10)), dec!(121));
    }

    #[test]
    fn test_compound_saturates_instead_of_overflowing() {
        assert_eq!(compound(dec!(0.5), 3000), Decimal::MAX);
        assert_eq!(future_value(dec!(1000), 3000, dec!(50)), Decimal::MAX);
        assert_eq!(future_value(Decimal::ZERO, 3000, dec!(50)), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
    }

    #[test]
    fn test_annuity_factor_zero_rate() {
        assert_eq!(annuity_fv_factor(Decimal::ZERO, 24), dec!(24));
    }

    #[test]
    fn test_annuity_factor_two_periods() {
        // (1.1^2 - 1) / 0.1 = 2.1
        assert_eq!(annuity_fv_factor(dec!(0.1), 2), dec!(2.1));
    }

    #[test]
    fn test_level_payment_standard_mortgage() {
        // 100k over 360 months at 6% -> ~599.55
        let pmt = level_payment(dec!(100_000), monthly_rate(dec!(6)), 360);
        assert!((pmt - dec!(599.55)).abs() < dec!(0.01), "pmt={}", pmt);
    }

    #[test]
    fn test_level_payment_zero_rate() {
        assert_eq!(level_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
    }
}
