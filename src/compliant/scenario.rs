//! Numbered conformance rules.

use serde::Serialize;

use super::context::Context;
use super::test_case::{TestCase, TestCaseResult};

/// Test cases sharing one context, all of which run regardless of earlier failures.
pub struct Scenario {
    id: String,
    name: String,
    spec_link: String,
    test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub id: String,
    pub name: String,
    pub spec_link: String,
    pub pass: bool,
    pub test_cases: Vec<TestCaseResult>,
}

impl Scenario {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec_link(&self) -> &str {
        &self.spec_link
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    /// Whether the id or name contains `filter`; an empty filter matches everything.
    pub fn matches(&self, filter: &str) -> bool {
        filter.is_empty() || self.id.contains(filter) || self.name.contains(filter)
    }

    /// Run every test case against a fresh context.
    pub async fn run(&self) -> ScenarioResult {
        tracing::info!(id = %self.id, name = %self.name, "running scenario");

        let mut ctx = Context::new();
        let mut test_cases = Vec::with_capacity(self.test_cases.len());
        for test_case in &self.test_cases {
            test_cases.push(test_case.run(&mut ctx).await);
        }

        let pass = test_cases.iter().all(|result| result.pass);
        tracing::info!(id = %self.id, pass, "scenario finished");

        ScenarioResult {
            id: self.id.clone(),
            name: self.name.clone(),
            spec_link: self.spec_link.clone(),
            pass,
            test_cases,
        }
    }
}

pub struct ScenarioBuilder {
    id: String,
    name: String,
    spec_link: String,
    test_cases: Vec<TestCase>,
}

impl ScenarioBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, spec_link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            spec_link: spec_link.into(),
            test_cases: Vec::new(),
        }
    }

    pub fn test_case(mut self, test_case: TestCase) -> Self {
        self.test_cases.push(test_case);
        self
    }

    pub fn test_cases(mut self, test_cases: impl IntoIterator<Item = TestCase>) -> Self {
        self.test_cases.extend(test_cases);
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            id: self.id,
            name: self.name,
            spec_link: self.spec_link,
            test_cases: self.test_cases,
        }
    }
}
