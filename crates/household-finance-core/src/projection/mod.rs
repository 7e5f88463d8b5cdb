pub mod engine;

pub use engine::{
    project_future_assets, simulate, ProjectionInput, ProjectionOptions, ProjectionResult,
    YearlyRecord,
};
