use serde::Serialize;

use super::scenario::{Scenario, ScenarioResult};

/// Named, versioned list of scenarios.
pub struct Manifest {
    name: String,
    version: String,
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestResult {
    pub name: String,
    pub version: String,
    pub pass: bool,
    pub scenarios: Vec<ScenarioResult>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            scenarios,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}
