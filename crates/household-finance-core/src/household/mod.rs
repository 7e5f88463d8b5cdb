pub mod snapshot;
pub mod validation;

pub use snapshot::{Asset, HouseholdSnapshot, Loan, RecurringInvestment, RepaymentType};
