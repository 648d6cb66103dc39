use async_trait::async_trait;

use super::{RESPONSE_KEY, Step, StepResult};
use crate::compliant::context::Context;

/// Response header carrying the server side transaction id
pub const TRANSACTION_ID_HEADER: &str = "x-fapi-interaction-id";

pub struct AlwaysPass;

#[async_trait]
impl Step for AlwaysPass {
    async fn run(&self, _ctx: &mut Context) -> StepResult {
        StepResult::pass("Always pass")
    }
}

pub struct AlwaysFail;

#[async_trait]
impl Step for AlwaysFail {
    async fn run(&self, _ctx: &mut Context) -> StepResult {
        StepResult::fail("Always fail", "always fail")
    }
}

/// Check the discovery document advertises a registration endpoint.
pub struct ValidateRegistrationEndpoint {
    registration_endpoint: Option<String>,
}

impl ValidateRegistrationEndpoint {
    pub fn new(registration_endpoint: Option<String>) -> Self {
        Self {
            registration_endpoint,
        }
    }
}

#[async_trait]
impl Step for ValidateRegistrationEndpoint {
    async fn run(&self, _ctx: &mut Context) -> StepResult {
        let name = "Validate registration endpoint";
        match self.registration_endpoint.as_deref() {
            Some(endpoint) if !endpoint.trim().is_empty() => StepResult::pass(name),
            Some(_) => StepResult::fail(name, "registration endpoint is empty"),
            None => StepResult::fail(name, "registration endpoint is missing from openid configuration"),
        }
    }
}

/// Surface the transaction id of the last response for diagnostics.
pub struct OutputTransactionId;

#[async_trait]
impl Step for OutputTransactionId {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Output transaction id";
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };

        let transaction_id = response
            .headers
            .get(TRANSACTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        tracing::debug!(%transaction_id, "registration response");

        StepResult::pass(name).with_debug(format!("{}: {}", TRANSACTION_ID_HEADER, transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use http::{HeaderMap, HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_fixed_outcomes() {
        let mut ctx = Context::new();
        assert!(AlwaysPass.run(&mut ctx).await.pass);

        let result = AlwaysFail.run(&mut ctx).await;
        assert!(!result.pass);
        assert_eq!(result.fail_reason.as_deref(), Some("always fail"));
    }

    #[tokio::test]
    async fn test_validate_registration_endpoint() {
        let mut ctx = Context::new();
        let present = ValidateRegistrationEndpoint::new(Some("https://as.example.com/register".to_string()));
        assert!(present.run(&mut ctx).await.pass);

        assert!(!ValidateRegistrationEndpoint::new(Some(String::new())).run(&mut ctx).await.pass);
        assert!(!ValidateRegistrationEndpoint::new(None).run(&mut ctx).await.pass);
    }

    #[tokio::test]
    async fn test_output_transaction_id() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSACTION_ID_HEADER, HeaderValue::from_static("abc-123"));

        let mut ctx = Context::new();
        ctx.set_response(
            RESPONSE_KEY,
            HttpResponse {
                status: StatusCode::CREATED,
                headers,
                body: Vec::new(),
            },
        );

        let result = OutputTransactionId.run(&mut ctx).await;
        assert!(result.pass);
        assert_eq!(result.debug, vec!["x-fapi-interaction-id: abc-123".to_string()]);
    }
}
