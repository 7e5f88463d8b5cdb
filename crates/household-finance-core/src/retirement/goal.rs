use log::{debug, trace, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HouseholdFinanceError;
use crate::household::HouseholdSnapshot;
use crate::time_value::{annuity_fv_factor, compound, fraction, future_value, monthly_rate};
use crate::types::*;
use crate::HouseholdFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a goal result carries no meaningful figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFlag {
    /// Retirement age is at or behind the current age.
    NoYearsToRetirement,
}

/// Retirement goal evaluated for one (contribution, return) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResult {
    pub target_assets: Money,
    pub projected_assets: Money,
    pub is_achievable: bool,
    pub shortfall: Money,
    pub surplus: Money,
    pub monthly_contribution: Money,
    pub annual_return_rate: Percent,
    pub years_to_retirement: u32,
    /// Retirement living plus medical cost per month, in retirement-year money.
    pub monthly_expense_at_retirement: Money,
    pub annual_expense_needed: Money,
    pub withdrawal_rate: Percent,
    pub current_assets: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<GoalFlag>,
}

/// Search bounds and stopping rule for the required-return bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BisectionConfig {
    pub lower: Percent,
    pub upper: Percent,
    /// Accepted absolute gap between projected and target assets.
    pub tolerance: Money,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        BisectionConfig {
            lower: Decimal::ZERO,
            upper: dec!(20),
            tolerance: dec!(0.01),
            max_iterations: 100,
        }
    }
}

/// Output of [`find_optimal_contribution`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalContributionOutput {
    pub monthly_contribution: Money,
    pub goal: GoalResult,
}

/// Output of [`find_required_return_rate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredReturnOutput {
    pub annual_return_rate: Percent,
    pub iterations: u32,
    pub converged: bool,
    pub goal: GoalResult,
}

// ---------------------------------------------------------------------------
// Closed forms
// ---------------------------------------------------------------------------

fn months_to_retirement(years: u32) -> u32 {
    years.saturating_mul(12)
}

fn positive_years(snapshot: &HouseholdSnapshot) -> Option<u32> {
    let ytr = snapshot.years_to_retirement();
    if ytr <= 0 {
        None
    } else {
        Some(u32::try_from(ytr).unwrap_or(u32::MAX))
    }
}

fn check_withdrawal_rate(withdrawal_rate: Percent) -> HouseholdFinanceResult<()> {
    if withdrawal_rate <= Decimal::ZERO {
        return Err(HouseholdFinanceError::invalid(
            "withdrawal_rate",
            "must be > 0",
        ));
    }
    Ok(())
}

/// Monthly retirement spending (living + medical) inflated to the retirement year.
pub fn monthly_expense_at_retirement(snapshot: &HouseholdSnapshot, years: u32) -> Money {
    future_value(
        snapshot.retirement_monthly_expense + snapshot.retirement_medical_expense,
        i64::from(years),
        snapshot.inflation_rate,
    )
}

/// Assets needed at retirement so that `withdrawal_rate` of them covers a year
/// of retirement spending.
pub fn target_assets(monthly_expense_at_retirement: Money, withdrawal_rate: Percent) -> Money {
    monthly_expense_at_retirement * MONTHS_PER_YEAR / fraction(withdrawal_rate)
}

/// `C(1+i)^n + PMT((1+i)^n - 1)/i`, or `C + PMT*n` at a zero rate.
pub fn projected_assets(
    current_assets: Money,
    monthly_contribution: Money,
    annual_return: Percent,
    months: u32,
) -> Money {
    let i = monthly_rate(annual_return);
    if i <= Decimal::ZERO {
        return current_assets + monthly_contribution * Decimal::from(months);
    }
    current_assets
        .saturating_mul(compound(i, months))
        .saturating_add(monthly_contribution.saturating_mul(annuity_fv_factor(i, months)))
}

fn zeroed_result(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    annual_return_rate: Percent,
    withdrawal_rate: Percent,
) -> GoalResult {
    GoalResult {
        target_assets: Decimal::ZERO,
        projected_assets: snapshot.total_assets,
        is_achievable: false,
        shortfall: Decimal::ZERO,
        surplus: Decimal::ZERO,
        monthly_contribution,
        annual_return_rate,
        years_to_retirement: 0,
        monthly_expense_at_retirement: Decimal::ZERO,
        annual_expense_needed: Decimal::ZERO,
        withdrawal_rate,
        current_assets: snapshot.total_assets,
        flag: Some(GoalFlag::NoYearsToRetirement),
    }
}

/// Evaluate the goal without the output envelope.
///
/// Callers must have checked the withdrawal rate.
pub fn evaluate_goal(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    annual_return_rate: Percent,
    withdrawal_rate: Percent,
) -> GoalResult {
    let years = match positive_years(snapshot) {
        Some(y) => y,
        None => {
            return zeroed_result(
                snapshot,
                monthly_contribution,
                annual_return_rate,
                withdrawal_rate,
            )
        }
    };

    let monthly_expense = monthly_expense_at_retirement(snapshot, years);
    let target = target_assets(monthly_expense, withdrawal_rate);
    let projected = projected_assets(
        snapshot.total_assets,
        monthly_contribution,
        annual_return_rate,
        months_to_retirement(years),
    );

    GoalResult {
        target_assets: target,
        projected_assets: projected,
        is_achievable: projected >= target,
        shortfall: (target - projected).max(Decimal::ZERO),
        surplus: (projected - target).max(Decimal::ZERO),
        monthly_contribution,
        annual_return_rate,
        years_to_retirement: years,
        monthly_expense_at_retirement: monthly_expense,
        annual_expense_needed: monthly_expense * MONTHS_PER_YEAR,
        withdrawal_rate,
        current_assets: snapshot.total_assets,
        flag: None,
    }
}

fn goal_warnings(goal: &GoalResult) -> Vec<String> {
    match goal.flag {
        Some(GoalFlag::NoYearsToRetirement) => {
            vec!["Retirement age is not after current age; goal not evaluated".into()]
        }
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Project assets at retirement for a given contribution and return, and
/// compare them with the withdrawal-rate target.
pub fn compute_retirement_goal(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    annual_return_rate: Percent,
    withdrawal_rate: Percent,
) -> HouseholdFinanceResult<ComputationOutput<GoalResult>> {
    let start = Instant::now();
    check_withdrawal_rate(withdrawal_rate)?;

    let goal = evaluate_goal(
        snapshot,
        monthly_contribution,
        annual_return_rate,
        withdrawal_rate,
    );
    let warnings = goal_warnings(&goal);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Withdrawal-rate target vs. monthly-compounded projection (FV of current assets + FV of contributions)",
        &serde_json::json!({
            "inflation_rate_pct": snapshot.inflation_rate.to_string(),
            "withdrawal_rate_pct": withdrawal_rate.to_string(),
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        goal,
    ))
}

/// Closed-form monthly contribution that exactly meets the target at the
/// given return. Clamped at 0 when current assets already suffice.
pub fn optimal_contribution(
    snapshot: &HouseholdSnapshot,
    target_return: Percent,
    withdrawal_rate: Percent,
) -> Money {
    let years = match positive_years(snapshot) {
        Some(y) => y,
        None => return Decimal::ZERO,
    };
    let months = months_to_retirement(years);
    let target = target_assets(monthly_expense_at_retirement(snapshot, years), withdrawal_rate);
    let i = monthly_rate(target_return);

    if i <= Decimal::ZERO {
        if months == 0 {
            return Decimal::ZERO;
        }
        return ((target - snapshot.total_assets) / Decimal::from(months)).max(Decimal::ZERO);
    }

    let from_current = snapshot.total_assets.saturating_mul(compound(i, months));
    let required = target - from_current;
    if required <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    required / annuity_fv_factor(i, months)
}

/// Monthly contribution needed to reach the target at `target_return`.
pub fn find_optimal_contribution(
    snapshot: &HouseholdSnapshot,
    target_return: Percent,
    withdrawal_rate: Percent,
) -> HouseholdFinanceResult<ComputationOutput<OptimalContributionOutput>> {
    let start = Instant::now();
    check_withdrawal_rate(withdrawal_rate)?;

    let contribution = optimal_contribution(snapshot, target_return, withdrawal_rate);
    let goal = evaluate_goal(snapshot, contribution, target_return, withdrawal_rate);
    debug!(
        "optimal contribution {} at {}% reaches {} of target {}",
        contribution, target_return, goal.projected_assets, goal.target_assets
    );
    let warnings = goal_warnings(&goal);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Closed-form annuity inversion: PMT = (target - C(1+i)^n) / (((1+i)^n - 1)/i), floored at 0",
        &serde_json::json!({
            "target_return_pct": target_return.to_string(),
            "withdrawal_rate_pct": withdrawal_rate.to_string(),
        }),
        warnings,
        elapsed,
        OptimalContributionOutput {
            monthly_contribution: contribution,
            goal,
        },
    ))
}

/// Outcome of the bisection search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionOutcome {
    pub rate: Percent,
    pub iterations: u32,
    pub converged: bool,
}

/// Bisect for the smallest annual return at which the projection meets the
/// target.
///
/// Returns the lower bound when it already suffices and the upper bound when
/// even that falls short. When the iteration budget runs out the upper end of
/// the final bracket is reported.
pub fn required_return_rate(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    withdrawal_rate: Percent,
    config: &BisectionConfig,
) -> BisectionOutcome {
    let years = match positive_years(snapshot) {
        Some(y) => y,
        None => {
            return BisectionOutcome {
                rate: Decimal::ZERO,
                iterations: 0,
                converged: true,
            }
        }
    };
    let months = months_to_retirement(years);
    let target = target_assets(monthly_expense_at_retirement(snapshot, years), withdrawal_rate);
    let fv = |rate: Percent| projected_assets(snapshot.total_assets, monthly_contribution, rate, months);

    if fv(config.lower) >= target {
        return BisectionOutcome {
            rate: config.lower,
            iterations: 0,
            converged: true,
        };
    }
    if fv(config.upper) < target {
        warn!(
            "required return exceeds search bound {}%; reporting the bound",
            config.upper
        );
        return BisectionOutcome {
            rate: config.upper,
            iterations: 0,
            converged: false,
        };
    }

    let mut lo = config.lower;
    let mut hi = config.upper;
    for iteration in 1..=config.max_iterations {
        let mid = (lo + hi) / dec!(2);
        let gap = fv(mid) - target;
        trace!("bisection {}: rate {} gap {}", iteration, mid, gap);

        if gap.abs() < config.tolerance {
            return BisectionOutcome {
                rate: mid,
                iterations: iteration,
                converged: true,
            };
        }
        if gap < Decimal::ZERO {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    warn!(
        "bisection did not converge within {} iterations; bracket [{}, {}]",
        config.max_iterations, lo, hi
    );
    BisectionOutcome {
        rate: hi,
        iterations: config.max_iterations,
        converged: false,
    }
}

/// Annual return needed to reach the target with a fixed monthly contribution,
/// searched with the default bracket `[0, 20]`.
pub fn find_required_return_rate(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    withdrawal_rate: Percent,
) -> HouseholdFinanceResult<ComputationOutput<RequiredReturnOutput>> {
    find_required_return_rate_with(
        snapshot,
        monthly_contribution,
        withdrawal_rate,
        &BisectionConfig::default(),
    )
}

/// [`find_required_return_rate`] with a caller-supplied search configuration.
pub fn find_required_return_rate_with(
    snapshot: &HouseholdSnapshot,
    monthly_contribution: Money,
    withdrawal_rate: Percent,
    config: &BisectionConfig,
) -> HouseholdFinanceResult<ComputationOutput<RequiredReturnOutput>> {
    let start = Instant::now();
    check_withdrawal_rate(withdrawal_rate)?;
    if config.upper < config.lower {
        return Err(HouseholdFinanceError::invalid(
            "upper",
            "search upper bound must be >= lower bound",
        ));
    }

    let outcome = required_return_rate(snapshot, monthly_contribution, withdrawal_rate, config);
    let goal = evaluate_goal(snapshot, monthly_contribution, outcome.rate, withdrawal_rate);

    let mut warnings = goal_warnings(&goal);
    if !outcome.converged {
        warnings.push(format!(
            "Target not reachable within [{}%, {}%]; reporting {}%",
            config.lower, config.upper, outcome.rate
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bisection on annual return over the monthly-compounded projection",
        &serde_json::json!({
            "lower_pct": config.lower.to_string(),
            "upper_pct": config.upper.to_string(),
            "tolerance": config.tolerance.to_string(),
            "max_iterations": config.max_iterations,
        }),
        warnings,
        elapsed,
        RequiredReturnOutput {
            annual_return_rate: outcome.rate,
            iterations: outcome.iterations,
            converged: outcome.converged,
            goal,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn goal_snapshot() -> HouseholdSnapshot {
        HouseholdSnapshot::from_json(
            r#"{"current_age": 30, "retirement_age": 60, "salary": 5000,
                "total_assets": 1000, "inflation_rate": 2.5,
                "retirement_monthly_expense": 150, "retirement_medical_expense": 45}"#,
        )
        .unwrap()
    }

    // ---------------------------------------------------------------
    // 1. Target and projection
    // ---------------------------------------------------------------
    #[test]
    fn test_target_uses_withdrawal_rate() {
        let snap = goal_snapshot();
        let goal = evaluate_goal(&snap, dec!(0), dec!(5), dec!(4));
        let expected = future_value(dec!(195), 30, dec!(2.5)) * dec!(12) / dec!(0.04);
        assert_eq!(goal.target_assets, expected);
        assert_eq!(goal.years_to_retirement, 30);
        assert_eq!(goal.flag, None);
    }

    #[test]
    fn test_zero_rate_projection_is_linear() {
        assert_eq!(
            projected_assets(dec!(1000), dec!(10), Decimal::ZERO, 360),
            dec!(4600)
        );
    }

    #[test]
    fn test_shortfall_and_surplus_are_exclusive() {
        let snap = goal_snapshot();
        let poor = evaluate_goal(&snap, dec!(1), dec!(3), dec!(4));
        assert!(!poor.is_achievable);
        assert!(poor.shortfall > Decimal::ZERO);
        assert_eq!(poor.surplus, Decimal::ZERO);

        let rich = evaluate_goal(&snap, dec!(1000), dec!(3), dec!(4));
        assert!(rich.is_achievable);
        assert_eq!(rich.shortfall, Decimal::ZERO);
        assert!(rich.surplus > Decimal::ZERO);
    }

    #[test]
    fn test_no_years_to_retirement_is_flagged() {
        let mut snap = goal_snapshot();
        snap.current_age = 60;
        let out = compute_retirement_goal(&snap, dec!(50), dec!(5), dec!(4)).unwrap();
        assert_eq!(out.result.flag, Some(GoalFlag::NoYearsToRetirement));
        assert_eq!(out.result.target_assets, Decimal::ZERO);
        assert_eq!(out.result.projected_assets, dec!(1000));
        assert!(!out.result.is_achievable);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_non_positive_withdrawal_rejected() {
        let snap = goal_snapshot();
        assert!(compute_retirement_goal(&snap, dec!(50), dec!(5), Decimal::ZERO).is_err());
        assert!(find_optimal_contribution(&snap, dec!(5), dec!(-1)).is_err());
        assert!(find_required_return_rate(&snap, dec!(50), Decimal::ZERO).is_err());
    }

    // ---------------------------------------------------------------
    // 2. Optimal contribution
    // ---------------------------------------------------------------
    #[test]
    fn test_optimal_contribution_meets_target() {
        let snap = goal_snapshot();
        let out = find_optimal_contribution(&snap, dec!(5), dec!(4)).unwrap();
        let goal = &out.result.goal;
        assert!((goal.projected_assets - goal.target_assets).abs() < dec!(0.000001));
    }

    #[test]
    fn test_optimal_contribution_clamped_at_zero() {
        let mut snap = goal_snapshot();
        snap.total_assets = dec!(1_000_000);
        assert_eq!(optimal_contribution(&snap, dec!(5), dec!(4)), Decimal::ZERO);
        assert_eq!(optimal_contribution(&snap, Decimal::ZERO, dec!(4)), Decimal::ZERO);
    }

    #[test]
    fn test_optimal_contribution_zero_rate() {
        let mut snap = goal_snapshot();
        snap.inflation_rate = Decimal::ZERO;
        snap.total_assets = Decimal::ZERO;
        // target = 195 * 12 / 0.04 = 58500 over 360 months
        assert_eq!(
            optimal_contribution(&snap, Decimal::ZERO, dec!(4)),
            dec!(162.5)
        );
    }

    // ---------------------------------------------------------------
    // 3. Required return
    // ---------------------------------------------------------------
    #[test]
    fn test_required_return_converges() {
        let snap = goal_snapshot();
        let out = find_required_return_rate(&snap, dec!(20), dec!(4)).unwrap();
        let r = &out.result;
        assert!(r.converged);
        assert!(r.annual_return_rate > Decimal::ZERO && r.annual_return_rate < dec!(20));
        assert!((r.goal.projected_assets - r.goal.target_assets).abs() < dec!(0.01));
    }

    #[test]
    fn test_required_return_infeasible_reports_upper_bound() {
        let mut snap = goal_snapshot();
        snap.total_assets = Decimal::ZERO;
        snap.retirement_monthly_expense = dec!(1_000_000);
        let out = find_required_return_rate(&snap, dec!(1), dec!(4)).unwrap();
        assert_eq!(out.result.annual_return_rate, dec!(20));
        assert!(!out.result.converged);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_required_return_already_met_reports_lower_bound() {
        let mut snap = goal_snapshot();
        snap.total_assets = dec!(10_000_000);
        let out = find_required_return_rate(&snap, dec!(0), dec!(4)).unwrap();
        assert_eq!(out.result.annual_return_rate, Decimal::ZERO);
        assert!(out.result.goal.is_achievable);
    }

    #[test]
    fn test_custom_bracket() {
        let snap = goal_snapshot();
        let config = BisectionConfig {
            lower: dec!(1),
            upper: dec!(2),
            ..BisectionConfig::default()
        };
        let out = find_required_return_rate_with(&snap, dec!(1), dec!(4), &config).unwrap();
        assert!(out.result.annual_return_rate <= dec!(2));
    }
}
