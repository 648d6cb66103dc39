//! Conformance engine: steps grouped into test cases, scenarios and manifests.

pub mod context;
pub mod dcr32;
pub mod manifest;
pub mod report;
pub mod scenario;
pub mod schema;
pub mod step;
pub mod test_case;
pub mod tester;

pub use context::Context;
pub use manifest::{Manifest, ManifestResult};
pub use report::{JsonReporter, Reporter, TextReporter};
pub use scenario::{Scenario, ScenarioBuilder, ScenarioResult};
pub use schema::{JsonSchemaValidator, SchemaValidator};
pub use step::{Step, StepResult};
pub use test_case::{TestCase, TestCaseBuilder, TestCaseResult};
pub use tester::Tester;
