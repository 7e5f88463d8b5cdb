pub mod goal;
pub mod sustainability;

pub use goal::{
    compute_retirement_goal, find_optimal_contribution, find_required_return_rate,
    find_required_return_rate_with, BisectionConfig, GoalFlag, GoalResult,
};
pub use sustainability::{assess_retirement_sustainability, SustainabilityStatus};
