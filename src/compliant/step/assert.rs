//! Assertions over the last stored response.

use async_trait::async_trait;
use http::StatusCode;
use std::sync::Arc;

use super::{RESPONSE_KEY, Step, StepResult};
use crate::compliant::context::Context;
use crate::compliant::schema::SchemaValidator;
use crate::oauth::types::OAuthErrorResponse;

pub struct AssertStatusCode {
    expected: StatusCode,
}

impl AssertStatusCode {
    pub fn new(expected: StatusCode) -> Self {
        Self { expected }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn created() -> Self {
        Self::new(StatusCode::CREATED)
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED)
    }
}

#[async_trait]
impl Step for AssertStatusCode {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = format!("Assert status code {}", self.expected.as_u16());
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };

        if response.status == self.expected {
            return StepResult::pass(name);
        }

        let body = response.body_text();
        let reason = if body.is_empty() {
            format!(
                "Expecting status code {}, got {}",
                self.expected.as_u16(),
                response.status.as_u16()
            )
        } else {
            format!(
                "Expecting status code {}, got {}: {}",
                self.expected.as_u16(),
                response.status.as_u16(),
                body
            )
        };
        StepResult::fail(name, reason)
    }
}

/// Check the OAuth error code and description of an error response body.
pub struct AssertErrorMessage {
    error: String,
    error_description: String,
}

impl AssertErrorMessage {
    pub fn new(error: impl Into<String>, error_description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: error_description.into(),
        }
    }
}

#[async_trait]
impl Step for AssertErrorMessage {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Assert error message";
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };

        let actual: OAuthErrorResponse = match serde_json::from_slice(&response.body) {
            Ok(actual) => actual,
            Err(err) => {
                return StepResult::fail(
                    name,
                    format!(
                        "unable to decode error response {}: {}",
                        response.body_text(),
                        err
                    ),
                );
            }
        };

        if actual.error != self.error {
            return StepResult::fail(
                name,
                format!("Expecting error '{}', got '{}'", self.error, actual.error),
            );
        }

        let description = actual.error_description.unwrap_or_default();
        if !self.error_description.is_empty() && description != self.error_description {
            return StepResult::fail(
                name,
                format!(
                    "Expecting error_description '{}', got '{}'",
                    self.error_description, description
                ),
            );
        }

        StepResult::pass(name)
    }
}

/// Validate the response body against a JSON schema.
pub struct AssertValidSchemaResponse {
    validator: Arc<dyn SchemaValidator>,
}

impl AssertValidSchemaResponse {
    pub fn new(validator: Arc<dyn SchemaValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Step for AssertValidSchemaResponse {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Assert valid schema response";
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };

        match self.validator.validate(&response.body) {
            Ok(()) => StepResult::pass(name),
            Err(err) => StepResult::fail(name, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliant::schema::JsonSchemaValidator;
    use crate::http::HttpResponse;
    use http::HeaderMap;

    fn context_with_response(status: StatusCode, body: &str) -> Context {
        let mut ctx = Context::new();
        ctx.set_response(
            RESPONSE_KEY,
            HttpResponse {
                status,
                headers: HeaderMap::new(),
                body: body.as_bytes().to_vec(),
            },
        );
        ctx
    }

    #[tokio::test]
    async fn test_status_code_match() {
        let mut ctx = context_with_response(StatusCode::CREATED, "");
        let result = AssertStatusCode::created().run(&mut ctx).await;
        assert!(result.pass);
        assert_eq!(result.name, "Assert status code 201");
    }

    #[tokio::test]
    async fn test_status_code_mismatch_reports_both_codes() {
        let mut ctx = context_with_response(StatusCode::BAD_REQUEST, "");
        let result = AssertStatusCode::created().run(&mut ctx).await;
        assert!(!result.pass);
        assert_eq!(
            result.fail_reason.as_deref(),
            Some("Expecting status code 201, got 400")
        );
    }

    #[tokio::test]
    async fn test_status_code_without_response() {
        let result = AssertStatusCode::ok().run(&mut Context::new()).await;
        assert!(!result.pass);
    }

    #[tokio::test]
    async fn test_error_message_match() {
        let mut ctx = context_with_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_redirect_uri","error_description":"bad uri"}"#,
        );
        let result = AssertErrorMessage::new("invalid_redirect_uri", "bad uri")
            .run(&mut ctx)
            .await;
        assert!(result.pass);
    }

    #[tokio::test]
    async fn test_error_message_mismatch() {
        let mut ctx = context_with_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_client_metadata"}"#,
        );
        let result = AssertErrorMessage::new("invalid_software_statement", "")
            .run(&mut ctx)
            .await;
        assert!(!result.pass);
        assert_eq!(
            result.fail_reason.as_deref(),
            Some("Expecting error 'invalid_software_statement', got 'invalid_client_metadata'")
        );
    }

    #[tokio::test]
    async fn test_error_description_mismatch() {
        let mut ctx = context_with_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_redirect_uri","error_description":"other"}"#,
        );
        let result = AssertErrorMessage::new("invalid_redirect_uri", "bad uri")
            .run(&mut ctx)
            .await;
        assert!(!result.pass);
    }

    #[tokio::test]
    async fn test_schema_response() {
        let validator: Arc<dyn SchemaValidator> = Arc::new(JsonSchemaValidator::dcr32().unwrap());

        let mut ctx = context_with_response(StatusCode::OK, r#"{"client_id":"12345"}"#);
        let result = AssertValidSchemaResponse::new(validator.clone())
            .run(&mut ctx)
            .await;
        assert!(result.pass);

        let mut ctx = context_with_response(StatusCode::OK, r#"{"client_name":"tpp"}"#);
        let result = AssertValidSchemaResponse::new(validator).run(&mut ctx).await;
        assert!(!result.pass);
    }
}
