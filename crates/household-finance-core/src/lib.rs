pub mod error;
pub mod household;
pub mod loans;
pub mod portfolio;
pub mod projection;
pub mod retirement;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "scoring")]
pub mod scoring;

pub use error::HouseholdFinanceError;
pub use types::*;

/// Standard result type for all household-finance computations
pub type HouseholdFinanceResult<T> = Result<T, HouseholdFinanceError>;
