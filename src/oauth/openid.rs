//! OpenID Connect discovery document retrieval.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::DiscoveryError;

/// The subset of the OpenID Provider metadata used by the conformance suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Issuer identifier of the authorization server
    #[serde(default)]
    pub issuer: String,

    /// Dynamic client registration endpoint, absent when registration is not offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<String>,

    /// Token endpoint used for the client credentials grant
    pub token_endpoint: String,

    /// Advertised client authentication methods, in server order
    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Vec<String>,

    /// Advertised request object algorithms; the first entry is the default
    #[serde(default, rename = "request_object_signing_alg_values_supported")]
    pub request_object_sign_alg_supported: Vec<String>,

    /// Advertised response types
    #[serde(default)]
    pub response_types_supported: Vec<String>,
}

impl Configuration {
    /// Registration endpoint, or an empty string when the server did not advertise one.
    pub fn registration_endpoint_as_string(&self) -> String {
        self.registration_endpoint.clone().unwrap_or_default()
    }

    /// Default request object signing algorithm, `none` when nothing is advertised.
    pub fn request_object_signing_alg(&self) -> String {
        self.request_object_sign_alg_supported
            .first()
            .cloned()
            .unwrap_or_else(|| "none".to_string())
    }
}

/// Fetch and decode the discovery document at `url`.
pub async fn fetch(url: &str, http_client: &reqwest::Client) -> Result<Configuration, DiscoveryError> {
    tracing::debug!(%url, "fetching openid configuration");

    let response = http_client
        .get(url)
        .send()
        .await
        .map_err(|err| DiscoveryError::RequestFailed(url.to_string(), err.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(DiscoveryError::UnexpectedStatus(
            url.to_string(),
            response.status().as_u16(),
        ));
    }

    response
        .json::<Configuration>()
        .await
        .map_err(|err| DiscoveryError::InvalidDocument(url.to_string(), err.to_string()))
}
