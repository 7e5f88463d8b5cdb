pub mod health;
pub mod risk;

pub use health::{financial_health_grade, monthly_savings, HealthGrade};
pub use risk::{crisis_scenario, income_interruption_survival, risk_score, RiskLevel};
