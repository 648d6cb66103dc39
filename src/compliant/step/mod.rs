//! Conformance steps: the atomic protocol interactions and assertions.
//!
//! A step never returns an error. Every failure is folded into a failing
//! [`StepResult`] whose reason is reported verbatim.

pub mod assert;
pub mod claims;
pub mod http;
pub mod misc;

pub use self::assert::{AssertErrorMessage, AssertStatusCode, AssertValidSchemaResponse};
pub use self::claims::{
    GenerateSignedClaims, GenerateSignedClaimsForRegistrationUpdate, ParseClientRegisterResponse,
    ParseClientRetrieveResponse,
};
pub use self::http::{
    ClientDelete, ClientRetrieve, ClientRetrieveInvalidRegistrationAccessToken, ClientUpdate,
    GetClientCredentialsGrant, PostClientRegister,
};
pub use self::misc::{AlwaysFail, AlwaysPass, OutputTransactionId, ValidateRegistrationEndpoint};

use async_trait::async_trait;
use serde::Serialize;

use super::context::Context;
use crate::http::HttpResponse;

/// Context key of the HTTP client a test case runs with
pub const HTTP_CLIENT_KEY: &str = "http_client";
/// Context key of the last HTTP response
pub const RESPONSE_KEY: &str = "response";
/// Context key of the registered software client
pub const CLIENT_KEY: &str = "client";
/// Context key of the client credentials grant token
pub const GRANT_TOKEN_KEY: &str = "grant_token";
/// Context key of the signed registration request
pub const CLAIMS_KEY: &str = "claims";
/// Context key of the discovery document
pub const OPENID_CONFIG_KEY: &str = "openid_config";

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub name: String,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    /// Diagnostic lines, such as a transaction id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<String>,
}

impl StepResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pass: true,
            fail_reason: None,
            debug: Vec::new(),
        }
    }

    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pass: false,
            fail_reason: Some(reason.into()),
            debug: Vec::new(),
        }
    }

    pub fn with_debug(mut self, line: impl Into<String>) -> Self {
        self.debug.push(line.into());
        self
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    async fn run(&self, ctx: &mut Context) -> StepResult;
}

/// Send a request and capture the whole response.
///
/// Errors carry the step failure wording for request construction, transport
/// and body read failures.
pub(crate) async fn execute(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<HttpResponse, String> {
    let (http_client, request) = request.build_split();
    let request = request.map_err(|err| format!("unable to create request {}: {}", url, err))?;

    tracing::debug!(method = %request.method(), %url, "calling endpoint");

    let response = http_client
        .execute(request)
        .await
        .map_err(|err| format!("unable to call endpoint {}: {}", url, err))?;

    HttpResponse::read(response)
        .await
        .map_err(|err| format!("unable to read response body {}: {}", url, err))
}

/// Registration management URL of a client.
pub(crate) fn client_url(registration_endpoint: &str, client_id: &str) -> String {
    format!("{}/{}", registration_endpoint.trim_end_matches('/'), client_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_joins_with_single_slash() {
        assert_eq!(
            client_url("https://as.example.com/register/", "12345"),
            "https://as.example.com/register/12345"
        );
        assert_eq!(client_url("https://as.example.com/register", "12345"), "https://as.example.com/register/12345");
    }

    #[tokio::test]
    async fn test_execute_reports_unbuildable_request() {
        let http_client = reqwest::Client::new();
        let err = execute(http_client.get("localhost/foo"), "localhost/foo")
            .await
            .unwrap_err();
        assert!(err.starts_with("unable to create request localhost/foo: "));
    }

    #[tokio::test]
    async fn test_execute_reports_transport_failure() {
        let http_client = reqwest::Client::new();
        let url = "http://127.0.0.1:1/register";
        let err = execute(http_client.get(url), url).await.unwrap_err();
        assert!(err.starts_with("unable to call endpoint http://127.0.0.1:1/register: "));
    }
}
