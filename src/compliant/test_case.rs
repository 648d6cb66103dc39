//! Ordered step sequences.

use serde::Serialize;
use std::sync::Arc;

use super::context::Context;
use super::schema::SchemaValidator;
use super::step::{
    AssertErrorMessage, AssertStatusCode, AssertValidSchemaResponse, ClientDelete, ClientRetrieve,
    ClientRetrieveInvalidRegistrationAccessToken, ClientUpdate, GenerateSignedClaims,
    GenerateSignedClaimsForRegistrationUpdate, GetClientCredentialsGrant, HTTP_CLIENT_KEY,
    OPENID_CONFIG_KEY, OutputTransactionId, ParseClientRegisterResponse,
    ParseClientRetrieveResponse, PostClientRegister, Step, StepResult,
    ValidateRegistrationEndpoint,
};
use crate::auth::AuthoriserBuilder;
use crate::oauth::openid::Configuration;

/// Steps run in order against one context, stopping at the first failure.
pub struct TestCase {
    name: String,
    steps: Vec<Box<dyn Step>>,
    http_client: Option<reqwest::Client>,
    openid_config: Option<Configuration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCaseResult {
    pub name: String,
    pub pass: bool,
    pub results: Vec<StepResult>,
}

impl TestCase {
    /// Test case with a fixed step list; an empty list always passes.
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            name: name.into(),
            steps,
            http_client: None,
            openid_config: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(&self, ctx: &mut Context) -> TestCaseResult {
        if let Some(http_client) = &self.http_client {
            ctx.set_http_client(HTTP_CLIENT_KEY, http_client.clone());
        }
        if let Some(openid_config) = &self.openid_config {
            ctx.set_openid_config(OPENID_CONFIG_KEY, openid_config.clone());
        }

        let mut results = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let result = step.run(ctx).await;
            let pass = result.pass;
            if !pass {
                tracing::warn!(
                    test_case = %self.name,
                    step = %result.name,
                    reason = result.fail_reason.as_deref().unwrap_or_default(),
                    "step failed"
                );
            }
            results.push(result);
            if !pass {
                break;
            }
        }

        TestCaseResult {
            name: self.name.clone(),
            pass: results.iter().all(|result| result.pass),
            results,
        }
    }
}

pub struct TestCaseBuilder {
    name: String,
    steps: Vec<Box<dyn Step>>,
    http_client: Option<reqwest::Client>,
    openid_config: Option<Configuration>,
}

impl TestCaseBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            http_client: None,
            openid_config: None,
        }
    }

    /// HTTP client stored in the context before the steps run.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_openid_config(mut self, openid_config: Configuration) -> Self {
        self.openid_config = Some(openid_config);
        self
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn validate_registration_endpoint(self, registration_endpoint: Option<String>) -> Self {
        self.step(ValidateRegistrationEndpoint::new(registration_endpoint))
    }

    pub fn generate_signed_claims(self, builder: AuthoriserBuilder) -> Self {
        self.step(GenerateSignedClaims::new(builder))
    }

    pub fn generate_signed_claims_for_registration_update(self, builder: AuthoriserBuilder) -> Self {
        self.step(GenerateSignedClaimsForRegistrationUpdate::new(builder))
    }

    pub fn post_client_register(self, registration_endpoint: impl Into<String>) -> Self {
        self.step(PostClientRegister::new(registration_endpoint))
    }

    pub fn parse_client_register_response(self, builder: AuthoriserBuilder) -> Self {
        self.step(ParseClientRegisterResponse::new(builder))
    }

    pub fn parse_client_retrieve_response(self) -> Self {
        self.step(ParseClientRetrieveResponse)
    }

    pub fn client_retrieve(self, registration_endpoint: impl Into<String>) -> Self {
        self.step(ClientRetrieve::new(registration_endpoint))
    }

    pub fn client_retrieve_invalid_registration_access_token(
        self,
        registration_endpoint: impl Into<String>,
    ) -> Self {
        self.step(ClientRetrieveInvalidRegistrationAccessToken::new(registration_endpoint))
    }

    pub fn client_update(self, registration_endpoint: impl Into<String>) -> Self {
        self.step(ClientUpdate::new(registration_endpoint))
    }

    pub fn client_delete(self, registration_endpoint: impl Into<String>) -> Self {
        self.step(ClientDelete::new(registration_endpoint))
    }

    pub fn get_client_credentials_grant(self, token_endpoint: impl Into<String>) -> Self {
        self.step(GetClientCredentialsGrant::new(token_endpoint))
    }

    pub fn output_transaction_id(self) -> Self {
        self.step(OutputTransactionId)
    }

    pub fn assert_status_code_ok(self) -> Self {
        self.step(AssertStatusCode::ok())
    }

    pub fn assert_status_code_created(self) -> Self {
        self.step(AssertStatusCode::created())
    }

    pub fn assert_status_code_no_content(self) -> Self {
        self.step(AssertStatusCode::no_content())
    }

    pub fn assert_status_code_bad_request(self) -> Self {
        self.step(AssertStatusCode::bad_request())
    }

    pub fn assert_status_code_unauthorized(self) -> Self {
        self.step(AssertStatusCode::unauthorized())
    }

    pub fn assert_error_message(
        self,
        error: impl Into<String>,
        error_description: impl Into<String>,
    ) -> Self {
        self.step(AssertErrorMessage::new(error, error_description))
    }

    pub fn assert_valid_schema_response(self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.step(AssertValidSchemaResponse::new(validator))
    }

    pub fn build(self) -> TestCase {
        TestCase {
            name: self.name,
            steps: self.steps,
            http_client: self.http_client,
            openid_config: self.openid_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliant::step::{AlwaysFail, AlwaysPass};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStep(Arc<AtomicUsize>);

    #[async_trait]
    impl Step for CountingStep {
        async fn run(&self, _ctx: &mut Context) -> StepResult {
            self.0.fetch_add(1, Ordering::SeqCst);
            StepResult::pass("Counting")
        }
    }

    #[tokio::test]
    async fn test_halts_at_first_failing_step() {
        let calls = Arc::new(AtomicUsize::new(0));
        let test_case = TestCaseBuilder::new("pass fail pass")
            .step(AlwaysPass)
            .step(AlwaysFail)
            .step(CountingStep(calls.clone()))
            .build();

        let result = test_case.run(&mut Context::new()).await;

        assert!(!result.pass);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[1].name, "Always fail");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_test_case_passes() {
        let test_case = TestCase::new("(SKIP Delete endpoint not implemented) Delete", Vec::new());
        let result = test_case.run(&mut Context::new()).await;
        assert!(result.pass);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn test_http_client_is_stored_before_steps() {
        let mut ctx = Context::new();
        let test_case = TestCaseBuilder::new("with client")
            .with_http_client(reqwest::Client::new())
            .with_openid_config(Configuration::default())
            .step(AlwaysPass)
            .build();

        assert!(test_case.run(&mut ctx).await.pass);
        assert!(ctx.get_http_client(HTTP_CLIENT_KEY).is_ok());
        assert!(ctx.get_openid_config(OPENID_CONFIG_KEY).is_ok());
    }
}
