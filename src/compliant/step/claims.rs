//! Steps that sign registration requests and parse registration responses.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CLAIMS_KEY, CLIENT_KEY, RESPONSE_KEY, Step, StepResult};
use crate::auth::AuthoriserBuilder;
use crate::compliant::context::Context;

/// Sign a registration request and store it for the register step.
pub struct GenerateSignedClaims {
    builder: AuthoriserBuilder,
}

impl GenerateSignedClaims {
    pub fn new(builder: AuthoriserBuilder) -> Self {
        Self { builder }
    }
}

#[async_trait]
impl Step for GenerateSignedClaims {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Generate signed software client claims";
        let claims = self
            .builder
            .build()
            .and_then(|authoriser| authoriser.claims());

        match claims {
            Ok(claims) => {
                ctx.set_string(CLAIMS_KEY, claims);
                StepResult::pass(name)
            }
            Err(err) => StepResult::fail(name, format!("unable to generate signed claims: {}", err)),
        }
    }
}

/// Sign a registration update request for the registered client.
pub struct GenerateSignedClaimsForRegistrationUpdate {
    builder: AuthoriserBuilder,
}

impl GenerateSignedClaimsForRegistrationUpdate {
    pub fn new(builder: AuthoriserBuilder) -> Self {
        Self { builder }
    }
}

#[async_trait]
impl Step for GenerateSignedClaimsForRegistrationUpdate {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Generate signed software client claims for registration update";
        let client_id = match ctx.get_client(CLIENT_KEY) {
            Ok(client) => client.id().to_string(),
            Err(err) => {
                return StepResult::fail(
                    name,
                    format!("unable to find client {} in context: {}", CLIENT_KEY, err),
                );
            }
        };

        let claims = self
            .builder
            .with_client_id(client_id)
            .build()
            .and_then(|authoriser| authoriser.update_claims());

        match claims {
            Ok(claims) => {
                ctx.set_string(CLAIMS_KEY, claims);
                StepResult::pass(name)
            }
            Err(err) => StepResult::fail(name, format!("unable to generate signed claims: {}", err)),
        }
    }
}

/// Turn a registration response into the registered client.
pub struct ParseClientRegisterResponse {
    builder: AuthoriserBuilder,
}

impl ParseClientRegisterResponse {
    pub fn new(builder: AuthoriserBuilder) -> Self {
        Self { builder }
    }
}

#[async_trait]
impl Step for ParseClientRegisterResponse {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Parse client register response";
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };

        let client = self
            .builder
            .build()
            .and_then(|authoriser| authoriser.client(&response.body));

        match client {
            Ok(client) => {
                tracing::debug!(client_id = client.id(), "registered software client");
                ctx.set_client(CLIENT_KEY, client);
                StepResult::pass(name)
            }
            Err(err) => StepResult::fail(name, format!("unable to parse client response: {}", err)),
        }
    }
}

#[derive(Deserialize)]
struct ClientRetrieveResponse {
    client_id: String,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    registration_client_uri: Option<String>,
}

/// Check a retrieve response describes the registered client and refresh it.
pub struct ParseClientRetrieveResponse;

#[async_trait]
impl Step for ParseClientRetrieveResponse {
    async fn run(&self, ctx: &mut Context) -> StepResult {
        let name = "Parse client retrieve response";
        let response = match ctx.get_response(RESPONSE_KEY) {
            Ok(response) => response,
            Err(err) => {
                return StepResult::fail(name, format!("unable to find response in context: {}", err));
            }
        };
        let client = match ctx.get_client(CLIENT_KEY) {
            Ok(client) => client,
            Err(err) => {
                return StepResult::fail(
                    name,
                    format!("unable to find client {} in context: {}", CLIENT_KEY, err),
                );
            }
        };

        let retrieved: ClientRetrieveResponse = match serde_json::from_slice(&response.body) {
            Ok(retrieved) => retrieved,
            Err(err) => {
                return StepResult::fail(
                    name,
                    format!("unable to parse client retrieve response: {}", err),
                );
            }
        };

        if retrieved.client_id != client.id() {
            return StepResult::fail(
                name,
                format!(
                    "client_id mismatch, expected {} got {}",
                    client.id(),
                    retrieved.client_id
                ),
            );
        }

        let refreshed = client.refreshed(retrieved.registration_client_uri, retrieved.client_secret);
        ctx.set_client(CLIENT_KEY, refreshed);
        StepResult::pass(name)
    }
}
