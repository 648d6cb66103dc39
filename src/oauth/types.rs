//! OAuth 2.0 value types shared by the authorisers and the conformance steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token endpoint client authentication methods the conformance suite can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// Mutual TLS client authentication (RFC 8705)
    TlsClientAuth,
    /// JWT assertion signed with the client's private key (RFC 7523)
    PrivateKeyJwt,
    /// JWT assertion signed with an HMAC over the client secret
    ClientSecretJwt,
    /// HTTP Basic with client id and secret
    ClientSecretBasic,
}

impl TokenEndpointAuthMethod {
    /// Fixed probe order used when no preference matches.
    pub const PRECEDENCE: [TokenEndpointAuthMethod; 4] = [
        TokenEndpointAuthMethod::TlsClientAuth,
        TokenEndpointAuthMethod::PrivateKeyJwt,
        TokenEndpointAuthMethod::ClientSecretJwt,
        TokenEndpointAuthMethod::ClientSecretBasic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenEndpointAuthMethod::TlsClientAuth => "tls_client_auth",
            TokenEndpointAuthMethod::PrivateKeyJwt => "private_key_jwt",
            TokenEndpointAuthMethod::ClientSecretJwt => "client_secret_jwt",
            TokenEndpointAuthMethod::ClientSecretBasic => "client_secret_basic",
        }
    }

    /// Whether the client proves itself at the token endpoint with a signed JWT.
    pub fn is_jwt_based(&self) -> bool {
        matches!(
            self,
            TokenEndpointAuthMethod::PrivateKeyJwt | TokenEndpointAuthMethod::ClientSecretJwt
        )
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenEndpointAuthMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::PRECEDENCE
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| value.to_string())
    }
}

/// Access token obtained through the client credentials grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// OAuth error body returned by the registration and token endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Registration endpoint response fields the conformance suite relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientRegistrationResponse {
    pub client_id: String,
    pub registration_access_token: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub registration_client_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_round_trips_through_str() {
        for method in TokenEndpointAuthMethod::PRECEDENCE {
            assert_eq!(method.as_str().parse::<TokenEndpointAuthMethod>(), Ok(method));
        }
        assert!("client_secret_post".parse::<TokenEndpointAuthMethod>().is_err());
    }

    #[test]
    fn test_auth_method_serializes_snake_case() {
        let value = serde_json::to_value(TokenEndpointAuthMethod::ClientSecretJwt).unwrap();
        assert_eq!(value, serde_json::json!("client_secret_jwt"));
    }

    #[test]
    fn test_registration_response_requires_access_token() {
        let result = serde_json::from_str::<ClientRegistrationResponse>(r#"{"client_id": "12345"}"#);
        assert!(result.is_err());
    }
}
