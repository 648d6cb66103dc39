//! Runs a manifest and reports the verdict.

use super::manifest::{Manifest, ManifestResult};
use super::report::Reporter;
use crate::errors::TesterError;

/// Runs the scenarios of a manifest selected by a filter and feeds the
/// result to its reporters.
///
/// A filter that selects no scenario is an error
/// ([`TesterError::NoScenariosSelected`]), never a vacuous pass.
pub struct Tester {
    filter: String,
    reporters: Vec<Box<dyn Reporter>>,
}

impl Tester {
    /// Tester running the scenarios whose id or name contains `filter`.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            reporters: Vec::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Run the selected scenarios in order and report them.
    ///
    /// Fails with [`TesterError::NoScenariosSelected`] before any scenario
    /// runs when nothing matches the filter.
    pub async fn run(&mut self, manifest: &Manifest) -> Result<ManifestResult, TesterError> {
        let selected: Vec<_> = manifest
            .scenarios()
            .iter()
            .filter(|scenario| scenario.matches(&self.filter))
            .collect();

        if selected.is_empty() {
            return Err(TesterError::NoScenariosSelected(self.filter.clone()));
        }
        tracing::info!(
            manifest = manifest.name(),
            selected = selected.len(),
            total = manifest.scenarios().len(),
            "running manifest"
        );

        let mut scenarios = Vec::with_capacity(selected.len());
        for scenario in selected {
            scenarios.push(scenario.run().await);
        }

        let result = ManifestResult {
            name: manifest.name().to_string(),
            version: manifest.version().to_string(),
            pass: scenarios.iter().all(|scenario| scenario.pass),
            scenarios,
        };

        for reporter in &mut self.reporters {
            reporter.report(&result)?;
        }

        Ok(result)
    }

    /// Whether every step of every selected scenario passed.
    pub async fn compliant(&mut self, manifest: &Manifest) -> Result<bool, TesterError> {
        Ok(self.run(manifest).await?.pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliant::scenario::ScenarioBuilder;
    use crate::compliant::step::{AlwaysFail, AlwaysPass};
    use crate::compliant::test_case::TestCaseBuilder;

    fn manifest() -> Manifest {
        Manifest::new(
            "DCR32",
            "1.0",
            vec![
                ScenarioBuilder::new("DCR-001", "passing scenario", "")
                    .test_case(TestCaseBuilder::new("pass").step(AlwaysPass).build())
                    .build(),
                ScenarioBuilder::new("DCR-002", "failing scenario", "")
                    .test_case(TestCaseBuilder::new("fail").step(AlwaysFail).build())
                    .build(),
            ],
        )
    }

    #[tokio::test]
    async fn test_failing_step_is_not_compliant() {
        assert!(!Tester::new("").compliant(&manifest()).await.unwrap());
    }

    #[tokio::test]
    async fn test_filter_selects_by_id() {
        let result = Tester::new("DCR-001").run(&manifest()).await.unwrap();
        assert!(result.pass);
        assert_eq!(result.scenarios.len(), 1);
        assert_eq!(result.scenarios[0].id, "DCR-001");

        let result = Tester::new("DCR-002").run(&manifest()).await.unwrap();
        assert!(!result.pass);
        assert_eq!(result.scenarios.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_selects_by_name() {
        let result = Tester::new("passing").run(&manifest()).await.unwrap();
        assert_eq!(result.scenarios.len(), 1);
        assert!(result.pass);
    }

    #[tokio::test]
    async fn test_empty_selection_is_an_error() {
        let result = Tester::new("DCR-404").compliant(&manifest()).await;
        assert!(matches!(result, Err(TesterError::NoScenariosSelected(filter)) if filter == "DCR-404"));
    }
}
