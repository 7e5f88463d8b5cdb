use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::health::{debt_ratio, expense_ratio, months_of_cover};
use crate::error::HouseholdFinanceError;
use crate::household::HouseholdSnapshot;
use crate::retirement::sustainability::{sustainability, RETIREMENT_HORIZON_YEARS};
use crate::time_value::fraction;
use crate::types::*;
use crate::HouseholdFinanceResult;

/// Default market drop for the crisis scenario, in percent.
pub const DEFAULT_ASSET_DROP: Percent = dec!(30);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Emergency-cover status: 6+ months safe, 3+ warning, otherwise danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverStatus {
    Safe,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Follow-up actions suggested by the risk score. Rendering is left to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    BuildEmergencyFund,
    ReduceDebt,
    ReduceSpending,
    IncreaseRetirementSavings,
    MaintainCourse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalOutput {
    /// `None` when monthly spending is zero.
    pub survival_months: Option<Decimal>,
    pub survival_years: Option<Decimal>,
    pub net_assets: Money,
    pub monthly_expense: Money,
    pub status: CoverStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisOutput {
    pub asset_drop_rate: Percent,
    pub assets_before: Money,
    pub assets_after: Money,
    pub net_assets_after: Money,
    pub survival_months: Option<Decimal>,
    pub status: CoverStatus,
}

/// Points per component. Higher is riskier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// 0 / 20 / 40
    pub income_interruption: u32,
    /// 0 / 10 / 20 / 30
    pub debt_ratio: u32,
    /// 0 / 10 / 20
    pub expense_ratio: u32,
    /// 0 / 5 / 10
    pub retirement_readiness: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskOutput {
    pub total_score: u32,
    pub risk_level: RiskLevel,
    pub breakdown: RiskBreakdown,
    pub recommendations: Vec<Recommendation>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cover_status(months: Option<Decimal>) -> CoverStatus {
    match months {
        None => CoverStatus::Safe,
        Some(m) if m >= dec!(6) => CoverStatus::Safe,
        Some(m) if m >= dec!(3) => CoverStatus::Warning,
        Some(_) => CoverStatus::Danger,
    }
}

fn survival(snapshot: &HouseholdSnapshot) -> SurvivalOutput {
    let net_assets = snapshot.net_assets();
    let monthly_expense = snapshot.monthly_expense();
    let survival_months = months_of_cover(net_assets, monthly_expense);
    SurvivalOutput {
        survival_months,
        survival_years: survival_months.map(|m| m / dec!(12)),
        net_assets,
        monthly_expense,
        status: cover_status(survival_months),
    }
}

fn risk_level(score: u32) -> RiskLevel {
    match score {
        0..=24 => RiskLevel::Low,
        25..=49 => RiskLevel::Medium,
        50..=74 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// How many months net assets cover current spending if income stops.
pub fn income_interruption_survival(
    snapshot: &HouseholdSnapshot,
) -> HouseholdFinanceResult<ComputationOutput<SurvivalOutput>> {
    let start = Instant::now();
    let output = survival(snapshot);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net assets divided by current monthly spending",
        &serde_json::json!({ "safe_months": 6, "warning_months": 3 }),
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Emergency cover after an immediate market drop of `asset_drop_rate` percent.
pub fn crisis_scenario(
    snapshot: &HouseholdSnapshot,
    asset_drop_rate: Percent,
) -> HouseholdFinanceResult<ComputationOutput<CrisisOutput>> {
    let start = Instant::now();
    if asset_drop_rate < Decimal::ZERO || asset_drop_rate > dec!(100) {
        return Err(HouseholdFinanceError::invalid(
            "asset_drop_rate",
            "must be between 0 and 100",
        ));
    }

    let assets_after = snapshot.total_assets * (Decimal::ONE - fraction(asset_drop_rate));
    let net_assets_after = assets_after - snapshot.total_debt;
    let survival_months = months_of_cover(net_assets_after, snapshot.monthly_expense());

    let mut warnings = Vec::new();
    if net_assets_after < Decimal::ZERO {
        warnings.push(format!(
            "Debt exceeds assets after a {asset_drop_rate}% drop"
        ));
    }

    let output = CrisisOutput {
        asset_drop_rate,
        assets_before: snapshot.total_assets,
        assets_after,
        net_assets_after,
        survival_months,
        status: cover_status(survival_months),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Uniform asset haircut, debt unchanged, cover measured against current spending",
        &serde_json::json!({ "asset_drop_rate_pct": asset_drop_rate.to_string() }),
        warnings,
        elapsed,
        output,
    ))
}

/// Composite 0-100 risk score.
///
/// Income interruption (40), debt ratio (30), expense ratio (20) and
/// retirement readiness (10). Levels: < 25 low, < 50 medium, < 75 high,
/// otherwise critical.
pub fn risk_score(
    snapshot: &HouseholdSnapshot,
) -> HouseholdFinanceResult<ComputationOutput<RiskOutput>> {
    let start = Instant::now();

    let income_interruption = match survival(snapshot).status {
        CoverStatus::Safe => 0,
        CoverStatus::Warning => 20,
        CoverStatus::Danger => 40,
    };

    let dr = debt_ratio(snapshot);
    let debt_points = if dr.is_zero() {
        0
    } else if dr < dec!(20) {
        10
    } else if dr < dec!(40) {
        20
    } else {
        30
    };

    let er = expense_ratio(snapshot);
    let expense_points = if er < dec!(50) {
        0
    } else if er < dec!(70) {
        10
    } else {
        20
    };

    let horizon = Decimal::from(RETIREMENT_HORIZON_YEARS);
    let retirement_points = match sustainability(snapshot).survival_years {
        None => 0,
        Some(y) if y >= horizon => 0,
        Some(y) if y >= horizon / dec!(2) => 5,
        Some(_) => 10,
    };

    let breakdown = RiskBreakdown {
        income_interruption,
        debt_ratio: debt_points,
        expense_ratio: expense_points,
        retirement_readiness: retirement_points,
    };
    let total_score = income_interruption + debt_points + expense_points + retirement_points;

    let mut recommendations = Vec::new();
    if income_interruption > 0 {
        recommendations.push(Recommendation::BuildEmergencyFund);
    }
    if debt_points > 0 {
        recommendations.push(Recommendation::ReduceDebt);
    }
    if expense_points > 0 {
        recommendations.push(Recommendation::ReduceSpending);
    }
    if retirement_points > 0 {
        recommendations.push(Recommendation::IncreaseRetirementSavings);
    }
    if recommendations.is_empty() {
        recommendations.push(Recommendation::MaintainCourse);
    }

    let output = RiskOutput {
        total_score,
        risk_level: risk_level(total_score),
        breakdown,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Additive rule-based score: income interruption 40, debt ratio 30, expense ratio 20, retirement readiness 10",
        &serde_json::json!({
            "retirement_horizon_years": RETIREMENT_HORIZON_YEARS,
            "level_cutoffs": [25, 50, 75],
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}
