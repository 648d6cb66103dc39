//! Steps that call the authorization server.

use async_trait::async_trait;
use http::StatusCode;
use http::header::{ACCEPT, CONTENT_TYPE};

use super::{
    CLAIMS_KEY, CLIENT_KEY, GRANT_TOKEN_KEY, HTTP_CLIENT_KEY, RESPONSE_KEY, Step, StepResult,
    client_url, execute,
};
use crate::compliant::context::Context;
use crate::oauth::types::GrantToken;

const CONTENT_TYPE_JOSE: &str = "application/jose";
const CONTENT_TYPE_JSON: &str = "application/json";

/// Registration access token presented by the invalid credentials check
const INVALID_REGISTRATION_ACCESS_TOKEN: &str = "invalid-registration-access-token";

macro_rules! from_context {
    ($name:expr, $lookup:expr, $what:expr, $key:expr) => {
        match $lookup {
            Ok(value) => value,
            Err(err) => {
                return StepResult::fail(
                    $name,
                    format!("unable to find {} {} in context: {}", $what, $key, err),
                );
            }
        }
    };
}

/// POST the signed registration request to the registration endpoint.
pub struct PostClientRegister {
    registration_endpoint: String,
}

impl PostClientRegister {
    pub fn new(registration_endpoint: impl Into<String>) -> Self {
        Self {
            registration_endpoint: registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for PostClientRegister {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Software client register";
        let claims = from_context!(name, ctx.get_string(CLAIMS_KEY), "claims", CLAIMS_KEY).to_string();
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = http_client
            .post(&self.registration_endpoint)
            .header(CONTENT_TYPE, CONTENT_TYPE_JOSE)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .body(claims);

        match execute(request, &self.registration_endpoint).await {
            Ok(response) => {
                ctx.set_response(RESPONSE_KEY, response);
                StepResult::pass(name)
            }
            Err(reason) => StepResult::fail(name, reason),
        }
    }
}

/// GET the registered client.
pub struct ClientRetrieve {
    registration_endpoint: String,
}

impl ClientRetrieve {
    pub fn new(registration_endpoint: impl Into<String>) -> Self {
        Self {
            registration_endpoint: registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for ClientRetrieve {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Software client retrieve";
        let client = from_context!(name, ctx.get_client(CLIENT_KEY), "client", CLIENT_KEY);
        let url = client_url(&self.registration_endpoint, client.id());
        let grant_token = from_context!(
            name,
            ctx.get_grant_token(GRANT_TOKEN_KEY),
            "grant token",
            GRANT_TOKEN_KEY
        );
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = http_client
            .get(&url)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .bearer_auth(&grant_token.access_token);

        match execute(request, &url).await {
            Ok(response) => {
                ctx.set_response(RESPONSE_KEY, response);
                StepResult::pass(name)
            }
            Err(reason) => StepResult::fail(name, reason),
        }
    }
}

/// GET the registered client presenting a bogus access token.
pub struct ClientRetrieveInvalidRegistrationAccessToken {
    registration_endpoint: String,
}

impl ClientRetrieveInvalidRegistrationAccessToken {
    pub fn new(registration_endpoint: impl Into<String>) -> Self {
        Self {
            registration_endpoint: registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for ClientRetrieveInvalidRegistrationAccessToken {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Software client retrieve with invalid registration access token";
        let client = from_context!(name, ctx.get_client(CLIENT_KEY), "client", CLIENT_KEY);
        let url = client_url(&self.registration_endpoint, client.id());
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = http_client
            .get(&url)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .bearer_auth(INVALID_REGISTRATION_ACCESS_TOKEN);

        match execute(request, &url).await {
            Ok(response) => {
                ctx.set_response(RESPONSE_KEY, response);
                StepResult::pass(name)
            }
            Err(reason) => StepResult::fail(name, reason),
        }
    }
}

/// PUT the signed registration update request for the registered client.
pub struct ClientUpdate {
    registration_endpoint: String,
}

impl ClientUpdate {
    pub fn new(registration_endpoint: impl Into<String>) -> Self {
        Self {
            registration_endpoint: registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for ClientUpdate {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Software client update";
        let client = from_context!(name, ctx.get_client(CLIENT_KEY), "client", CLIENT_KEY);
        let url = client_url(&self.registration_endpoint, client.id());
        let claims = from_context!(name, ctx.get_string(CLAIMS_KEY), "claims", CLAIMS_KEY).to_string();
        let grant_token = from_context!(
            name,
            ctx.get_grant_token(GRANT_TOKEN_KEY),
            "grant token",
            GRANT_TOKEN_KEY
        );
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = http_client
            .put(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JOSE)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .bearer_auth(&grant_token.access_token)
            .body(claims);

        match execute(request, &url).await {
            Ok(response) => {
                ctx.set_response(RESPONSE_KEY, response);
                StepResult::pass(name)
            }
            Err(reason) => StepResult::fail(name, reason),
        }
    }
}

/// DELETE the registered client.
pub struct ClientDelete {
    registration_endpoint: String,
}

impl ClientDelete {
    pub fn new(registration_endpoint: impl Into<String>) -> Self {
        Self {
            registration_endpoint: registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for ClientDelete {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Software client delete";
        let client = from_context!(name, ctx.get_client(CLIENT_KEY), "client", CLIENT_KEY);
        let url = client_url(&self.registration_endpoint, client.id());
        let grant_token = from_context!(
            name,
            ctx.get_grant_token(GRANT_TOKEN_KEY),
            "grant token",
            GRANT_TOKEN_KEY
        );
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = http_client
            .delete(&url)
            .bearer_auth(&grant_token.access_token);

        match execute(request, &url).await {
            Ok(response) => {
                ctx.set_response(RESPONSE_KEY, response);
                StepResult::pass(name)
            }
            Err(reason) => StepResult::fail(name, reason),
        }
    }
}

/// Obtain an access token with the client credentials grant and store it.
pub struct GetClientCredentialsGrant {
    token_endpoint: String,
}

impl GetClientCredentialsGrant {
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
        }
    }
}

#[async_trait]
impl Step for GetClientCredentialsGrant {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Client credentials grant";
        let client = from_context!(name, ctx.get_client(CLIENT_KEY), "client", CLIENT_KEY);
        let http_client = from_context!(
            name,
            ctx.get_http_client(HTTP_CLIENT_KEY),
            "http client",
            HTTP_CLIENT_KEY
        );

        let request = match client.credentials_grant_request(http_client, &self.token_endpoint) {
            Ok(request) => request,
            Err(err) => {
                return StepResult::fail(
                    name,
                    format!("unable to create request {}: {}", self.token_endpoint, err),
                );
            }
        };

        let response = match execute(request, &self.token_endpoint).await {
            Ok(response) => response,
            Err(reason) => return StepResult::fail(name, reason),
        };

        if response.status != StatusCode::OK {
            let reason = format!(
                "unexpected status code {} from token endpoint {}: {}",
                response.status.as_u16(),
                self.token_endpoint,
                response.body_text()
            );
            ctx.set_response(RESPONSE_KEY, response);
            return StepResult::fail(name, reason);
        }

        let decoded = serde_json::from_slice::<GrantToken>(&response.body);
        ctx.set_response(RESPONSE_KEY, response);
        let grant_token = match decoded {
            Ok(grant_token) => grant_token,
            Err(err) => {
                return StepResult::fail(name, format!("unable to decode grant token: {}", err));
            }
        };

        ctx.set_grant_token(GRANT_TOKEN_KEY, grant_token);
        StepResult::pass(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::clients::{Client, ClientCredentials};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context_with_client() -> Context {
        let mut ctx = Context::new();
        ctx.set_http_client(HTTP_CLIENT_KEY, reqwest::Client::new());
        ctx.set_client(
            CLIENT_KEY,
            Client::new(
                "foo",
                "abcdef",
                None,
                ClientCredentials::ClientSecretBasic {
                    secret: "bar".to_string(),
                },
            ),
        );
        ctx.set_grant_token(
            GRANT_TOKEN_KEY,
            GrantToken {
                access_token: "token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: Some(3600),
                scope: None,
            },
        );
        ctx
    }

    #[tokio::test]
    async fn test_client_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/foo"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        let result = ClientDelete::new(server.uri()).run(&mut ctx).await;

        assert!(result.pass);
        assert_eq!(result.name, "Software client delete");
        assert_eq!(result.fail_reason, None);
        assert_eq!(ctx.get_response(RESPONSE_KEY).unwrap().status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_client_delete_handles_create_request_error() {
        let mut ctx = context_with_client();
        let result = ClientDelete::new("localhost").run(&mut ctx).await;

        assert!(!result.pass);
        assert!(
            result
                .fail_reason
                .unwrap()
                .starts_with("unable to create request localhost/foo: ")
        );
    }

    #[tokio::test]
    async fn test_client_delete_handles_missing_client() {
        let mut ctx = Context::new();
        ctx.set_http_client(HTTP_CLIENT_KEY, reqwest::Client::new());
        let result = ClientDelete::new("https://as.example.com/register").run(&mut ctx).await;

        assert!(!result.pass);
        assert_eq!(
            result.fail_reason.as_deref(),
            Some("unable to find client client in context: error-dcr-context-1 key not found in context: client")
        );
    }

    #[tokio::test]
    async fn test_post_client_register_sends_jose_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(header("content-type", CONTENT_TYPE_JOSE))
            .and(body_string("signed.jwt.claims"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let mut ctx = Context::new();
        ctx.set_http_client(HTTP_CLIENT_KEY, reqwest::Client::new());
        ctx.set_string(CLAIMS_KEY, "signed.jwt.claims");

        let result = PostClientRegister::new(format!("{}/register", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(result.pass);
        assert_eq!(ctx.get_response(RESPONSE_KEY).unwrap().status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_post_client_register_requires_claims() {
        let mut ctx = Context::new();
        ctx.set_http_client(HTTP_CLIENT_KEY, reqwest::Client::new());
        let result = PostClientRegister::new("https://as.example.com/register")
            .run(&mut ctx)
            .await;
        assert!(!result.pass);
    }

    #[tokio::test]
    async fn test_client_retrieve_invalid_token_uses_bogus_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/register/foo"))
            .and(header(
                "authorization",
                format!("Bearer {}", INVALID_REGISTRATION_ACCESS_TOKEN).as_str(),
            ))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        let result = ClientRetrieveInvalidRegistrationAccessToken::new(format!("{}/register", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(result.pass);
        assert_eq!(ctx.get_response(RESPONSE_KEY).unwrap().status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_client_update_puts_update_claims() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/register/foo"))
            .and(body_string("update.jwt.claims"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        ctx.set_string(CLAIMS_KEY, "update.jwt.claims");
        let result = ClientUpdate::new(format!("{}/register", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(result.pass);
    }

    #[tokio::test]
    async fn test_client_credentials_grant_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "granted",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        let result = GetClientCredentialsGrant::new(format!("{}/token", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(result.pass);
        assert_eq!(ctx.get_grant_token(GRANT_TOKEN_KEY).unwrap().access_token, "granted");
    }

    #[tokio::test]
    async fn test_client_credentials_grant_rejects_non_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        let result = GetClientCredentialsGrant::new(format!("{}/token", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(!result.pass);
        assert!(result.fail_reason.unwrap().contains("unexpected status code 401"));
        assert_eq!(ctx.get_grant_token(GRANT_TOKEN_KEY).unwrap().access_token, "token");
    }

    #[tokio::test]
    async fn test_client_credentials_grant_keeps_undecodable_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a token"))
            .mount(&server)
            .await;

        let mut ctx = context_with_client();
        let result = GetClientCredentialsGrant::new(format!("{}/token", server.uri()))
            .run(&mut ctx)
            .await;

        assert!(!result.pass);
        assert!(result.fail_reason.unwrap().starts_with("unable to decode grant token"));
        let response = ctx.get_response(RESPONSE_KEY).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"not a token");
    }
}
