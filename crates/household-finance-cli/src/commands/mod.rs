pub mod household;
pub mod projection;
pub mod retirement;
pub mod scenarios;
pub mod scoring;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use household_finance_core::household::validation::{consistency_warnings, validate_snapshot};
use household_finance_core::household::HouseholdSnapshot;

use crate::input;

/// Read a typed document from `--input` or piped stdin.
pub(crate) fn load<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!("reading {what} from {path}");
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("reading {what} from stdin");
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json|file.yaml> or stdin required for {what}").into())
    }
}

/// Load a household snapshot and run it through the validation boundary.
pub(crate) fn load_snapshot(
    path: Option<&str>,
) -> Result<HouseholdSnapshot, Box<dyn std::error::Error>> {
    let snapshot: HouseholdSnapshot = load(path, "household snapshot")?;
    checked(snapshot)
}

/// Validate a snapshot that arrived inside a larger document.
pub(crate) fn checked(
    snapshot: HouseholdSnapshot,
) -> Result<HouseholdSnapshot, Box<dyn std::error::Error>> {
    validate_snapshot(&snapshot)?;
    for w in consistency_warnings(&snapshot) {
        warn!("{w}");
    }
    Ok(snapshot)
}
