use household_finance_core::household::{HouseholdSnapshot, Loan, RepaymentType};
use household_finance_core::projection::{
    project_future_assets, simulate, ProjectionInput, ProjectionOptions,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Future asset projection: end-to-end behaviour of the yearly loop
// ===========================================================================

fn household() -> HouseholdSnapshot {
    HouseholdSnapshot::from_json(
        r#"{
            "current_age": 30,
            "retirement_age": 60,
            "salary": 5000,
            "monthly_fixed_expense": 150,
            "monthly_variable_expense": 50,
            "total_assets": 1000,
            "total_debt": 0,
            "inflation_rate": 2.5
        }"#,
    )
    .unwrap()
}

fn input(snapshot: HouseholdSnapshot, years: u32) -> ProjectionInput {
    ProjectionInput {
        snapshot,
        years,
        inflation_rate: None,
        include_post_retirement: true,
        life_expectancy: 83,
    }
}

fn loaded_household() -> HouseholdSnapshot {
    let mut snap = household();
    snap.total_assets = dec!(40_000);
    snap.total_debt = dec!(30_000);
    snap.loans = vec![
        Loan {
            name: Some("mortgage".into()),
            principal: dec!(20_000),
            annual_rate: dec!(4),
            repayment_type: RepaymentType::EqualInstallment,
            monthly_payment: None,
            remaining_months: 240,
            total_months: 360,
            is_deposit_return: false,
        },
        Loan {
            name: Some("lease deposit".into()),
            principal: dec!(10_000),
            annual_rate: dec!(3),
            repayment_type: RepaymentType::InterestOnlyBalloon,
            monthly_payment: None,
            remaining_months: 30,
            total_months: 48,
            is_deposit_return: true,
        },
    ];
    snap
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_end_to_end_five_years() {
    let out = project_future_assets(&input(household(), 5)).unwrap();
    let result = out.result;

    assert_eq!(result.yearly_records.len(), 5);
    assert_eq!(result.yearly_records[0].annual_expense, dec!(2460));
    assert_eq!(result.current_assets, dec!(1000));
    assert!(result.future_assets > dec!(1000));
    assert_eq!(
        result.total_savings,
        result.future_assets - result.current_assets
    );

    let mut prev = result.current_assets;
    for record in &result.yearly_records {
        assert!(record.annual_savings > Decimal::ZERO);
        assert!(record.assets > prev, "assets must rise in year {}", record.year);
        prev = record.assets;
    }
}

#[test]
fn test_ages_and_years_are_sequential() {
    let result = simulate(&household(), &ProjectionOptions::for_snapshot(&household(), 3));
    let ages: Vec<u32> = result.yearly_records.iter().map(|r| r.age).collect();
    assert_eq!(ages, vec![31, 32, 33]);
}

// ---------------------------------------------------------------------------
// Snapshot idempotence
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_unchanged_after_projection() {
    let snap = loaded_household();
    let before = snap.clone();
    let projection = input(snap, 30);

    let first = project_future_assets(&projection).unwrap().result;
    assert_eq!(projection.snapshot, before);

    let second = project_future_assets(&projection).unwrap().result;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Monotonicity
// ---------------------------------------------------------------------------

#[test]
fn test_more_investment_never_lowers_assets() {
    let low = household();
    let mut high = household();
    high.recurring_investments
        .push(household_finance_core::household::RecurringInvestment {
            name: "etf".into(),
            monthly_amount: dec!(50),
        });
    let opts = ProjectionOptions::for_snapshot(&low, 10);
    let a = simulate(&low, &opts);
    let b = simulate(&high, &opts);
    for (x, y) in a.yearly_records.iter().zip(&b.yearly_records) {
        assert!(y.assets >= x.assets);
    }
}

#[test]
fn test_higher_return_never_lowers_assets() {
    let mut low = household();
    low.assets = vec![household_finance_core::household::Asset::Equity {
        amount: dec!(1000),
        return_rate: dec!(2),
    }];
    let mut high = low.clone();
    high.assets = vec![household_finance_core::household::Asset::Equity {
        amount: dec!(1000),
        return_rate: dec!(8),
    }];
    let opts = ProjectionOptions::for_snapshot(&low, 10);
    assert!(simulate(&high, &opts).future_assets > simulate(&low, &opts).future_assets);
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[test]
fn test_debt_declines_and_deposit_never_hits_assets() {
    let snap = loaded_household();
    let result = simulate(&snap, &ProjectionOptions::for_snapshot(&snap, 5));

    // The deposit-return loan matures in year 3 without touching assets:
    // total debt drops by its principal while assets keep rising.
    let y2 = &result.yearly_records[1];
    let y3 = &result.yearly_records[2];
    assert!(y3.assets > y2.assets);
    assert!(y2.total_debt > dec!(10_000));
    assert!(y3.total_debt < dec!(20_000));
    assert!(y3.principal_paid < dec!(10_000));

    let mut prev = snap.total_debt;
    for record in &result.yearly_records {
        assert!(record.total_debt <= prev);
        prev = record.total_debt;
    }
}

#[test]
fn test_deposit_return_loan_costs_only_its_interest() {
    let mut without = household();
    without.assets = vec![household_finance_core::household::Asset::Equity {
        amount: dec!(1000),
        return_rate: dec!(5),
    }];
    let mut with = without.clone();
    with.total_debt = dec!(10_000);
    with.loans = vec![Loan {
        name: Some("lease deposit".into()),
        principal: dec!(10_000),
        annual_rate: dec!(3),
        repayment_type: RepaymentType::InterestOnlyBalloon,
        monthly_payment: None,
        remaining_months: 30,
        total_months: 48,
        is_deposit_return: true,
    }];

    let opts = ProjectionOptions::for_snapshot(&without, 5);
    let base = simulate(&without, &opts);
    let loaded = simulate(&with, &opts);

    // 25 a month for 12, 12 and 6 months, each year's outflow compounding
    // at 5% until year 5. The principal itself never leaves assets.
    let growth = dec!(1.05);
    let expected = dec!(300) * growth * growth * growth * growth
        + dec!(300) * growth * growth * growth
        + dec!(150) * growth * growth;
    let gap = base.future_assets - loaded.future_assets;
    assert!((gap - expected).abs() < dec!(0.0001), "gap={gap}, expected={expected}");
    assert_eq!(loaded.yearly_records[4].total_debt, Decimal::ZERO);
}

#[test]
fn test_net_assets_consistent() {
    let snap = loaded_household();
    let result = simulate(&snap, &ProjectionOptions::for_snapshot(&snap, 10));
    for r in &result.yearly_records {
        assert_eq!(r.net_assets, r.assets - r.total_debt);
    }
}

// ---------------------------------------------------------------------------
// Post-retirement
// ---------------------------------------------------------------------------

#[test]
fn test_depletion_terminates_run() {
    let mut snap = household();
    snap.current_age = 58;
    snap.retirement_monthly_expense = dec!(2000);
    let out = project_future_assets(&input(snap, 2)).unwrap();
    let result = out.result;

    let last = result.yearly_records.last().unwrap();
    assert!(last.is_retired);
    assert_eq!(last.assets, Decimal::ZERO);
    assert_eq!(result.depleted_at_age, Some(last.age));
    assert!(last.age < 83);
    assert!(out.warnings.iter().any(|w| w.contains("exhausted")));
}

#[test]
fn test_full_life_when_well_funded() {
    let mut snap = household();
    snap.current_age = 55;
    snap.total_assets = dec!(10_000_000);
    let result = project_future_assets(&input(snap, 5)).unwrap().result;
    assert!(result.retirement_reached);
    assert_eq!(result.depleted_at_age, None);
    assert_eq!(result.yearly_records.last().unwrap().age, 83);
    assert_eq!(result.years_simulated, 5 + 23);
}

#[test]
fn test_post_retirement_skipped_when_not_requested() {
    let mut snap = household();
    snap.current_age = 55;
    let mut projection = input(snap, 5);
    projection.include_post_retirement = false;
    let result = project_future_assets(&projection).unwrap().result;
    assert!(result.yearly_records.iter().all(|r| !r.is_retired));
}

// ---------------------------------------------------------------------------
// Zero-rate degeneracy
// ---------------------------------------------------------------------------

#[test]
fn test_zero_rates_are_linear() {
    let mut snap = household();
    snap.salary_growth_rate = Decimal::ZERO;
    snap.inflation_rate = Decimal::ZERO;
    let result = simulate(&snap, &ProjectionOptions::for_snapshot(&snap, 4));
    // 5000 - 2400 = 2600 per year, no growth on assets
    assert_eq!(result.future_assets, dec!(1000) + dec!(2600) * dec!(4));
}
