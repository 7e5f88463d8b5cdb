pub mod scenario;

pub use scenario::{apply_scenario, compare_scenarios, ScenarioDelta, ScenarioInput};
