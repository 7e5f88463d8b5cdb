pub mod amortization;

pub use amortization::{advance_loans, advance_year, LoanBookYear, LoanYear};
