pub mod returns;
pub mod valuation;
