//! Scenarios: recorded user journeys and the engine that replays them.

pub mod executor;
pub mod schema;

pub use executor::{ScenarioExecutor, SuiteRunner};
pub use schema::{Condition, Scenario, Step, MAX_WAIT_SECONDS};

use crate::result::{GroundcheckError, GroundcheckResult};

const BUILTIN: [(&str, &str); 3] = [
    ("take_off", include_str!("../../resources/scenarios/take_off.yaml")),
    ("landing", include_str!("../../resources/scenarios/landing.yaml")),
    ("waypoint", include_str!("../../resources/scenarios/waypoint.yaml")),
];

/// Names of the bundled GCS scenarios, in run order
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}

/// Parse every bundled scenario
pub fn builtin_scenarios() -> GroundcheckResult<Vec<Scenario>> {
    BUILTIN.iter().map(|(_, yaml)| Scenario::from_yaml(yaml)).collect()
}

/// Parse one bundled scenario by name
pub fn builtin_scenario(name: &str) -> GroundcheckResult<Scenario> {
    let (_, yaml) = BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| GroundcheckError::invalid_scenario(name, "no such built-in scenario"))?;
    Scenario::from_yaml(yaml)
}
