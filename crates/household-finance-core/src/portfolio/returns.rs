use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::valuation::recurring_savings_maturity_value;
use crate::household::Asset;
use crate::types::*;
use crate::HouseholdFinanceResult;

/// Conservative appreciation assumed for real estate. Not user-editable.
pub const REAL_ESTATE_RETURN: Percent = dec!(2.5);

/// Holding category, used in the per-holding breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Deposit,
    RecurringSavings,
    RealEstate,
    Equity,
}

/// One holding's contribution to the weighted return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingReturn {
    pub kind: HoldingKind,
    pub weight: Money,
    pub annual_return: Percent,
}

/// Output of the portfolio return aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReturnOutput {
    /// Value-weighted average annual return.
    pub annual_return: Percent,
    pub itemized_value: Money,
    /// Itemized value as a fraction of the declared total assets.
    pub coverage: Decimal,
    pub holdings: Vec<HoldingReturn>,
}

/// Weight and expected annual return for a single holding.
pub fn holding_return(asset: &Asset) -> HoldingReturn {
    match asset {
        Asset::Deposit {
            principal,
            annual_rate,
            ..
        } => HoldingReturn {
            kind: HoldingKind::Deposit,
            weight: *principal,
            annual_return: *annual_rate,
        },
        Asset::RecurringSavings {
            monthly_amount,
            months,
            annual_rate,
            compound,
        } => HoldingReturn {
            kind: HoldingKind::RecurringSavings,
            weight: recurring_savings_maturity_value(
                *monthly_amount,
                *months,
                *annual_rate,
                *compound,
            ),
            annual_return: *annual_rate,
        },
        Asset::RealEstate { market_value } => HoldingReturn {
            kind: HoldingKind::RealEstate,
            weight: *market_value,
            annual_return: REAL_ESTATE_RETURN,
        },
        Asset::Equity {
            amount,
            return_rate,
        } => HoldingReturn {
            kind: HoldingKind::Equity,
            weight: *amount,
            annual_return: *return_rate,
        },
    }
}

/// Value-weighted return across holdings; 0 for an empty or weightless book.
///
/// The projection applies this one rate to every simulated year. Holdings are
/// not re-weighted as they grow.
pub fn portfolio_return(assets: &[Asset]) -> Percent {
    let (weighted, total) = assets
        .iter()
        .map(holding_return)
        .fold((Decimal::ZERO, Decimal::ZERO), |(acc, w), h| {
            (acc + h.weight * h.annual_return, w + h.weight)
        });

    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    weighted / total
}

/// Weighted portfolio return with a per-holding breakdown.
///
/// `total_assets` is the household's declared total; it only feeds the
/// coverage figure and never changes the rate.
pub fn compute_portfolio_return(
    assets: &[Asset],
    total_assets: Money,
) -> HouseholdFinanceResult<ComputationOutput<PortfolioReturnOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let holdings: Vec<HoldingReturn> = assets.iter().map(holding_return).collect();
    let itemized_value: Money = holdings.iter().map(|h| h.weight).sum();
    let annual_return = portfolio_return(assets);

    let coverage = if total_assets > Decimal::ZERO {
        itemized_value / total_assets
    } else {
        Decimal::ZERO
    };

    if assets.is_empty() {
        warnings.push("No holdings itemized; portfolio return is 0%".into());
    }
    if total_assets > Decimal::ZERO && itemized_value > total_assets {
        warnings.push(format!(
            "Itemized holdings {} exceed declared total assets {}",
            itemized_value.round_dp(2),
            total_assets
        ));
    }

    let output = PortfolioReturnOutput {
        annual_return,
        itemized_value,
        coverage,
        holdings,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Value-weighted average annual return (static over horizon)",
        &serde_json::json!({
            "real_estate_return_pct": REAL_ESTATE_RETURN.to_string(),
            "recurring_savings_weight": "maturity value",
            "num_holdings": assets.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
