//! Registration request JWT construction and signing.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::SigningError;
use crate::oauth::types::TokenEndpointAuthMethod;

/// Scope requested for every registered software client
pub const REGISTRATION_SCOPE: &str = "accounts openid";

/// Lifetime of client assertions presented at the token endpoint
const CLIENT_ASSERTION_LIFETIME_MINUTES: i64 = 10;

/// Claim set of a registration (or registration update) request
#[derive(Serialize)]
struct RegistrationClaims<'a> {
    iss: &'a str,
    iat: i64,
    exp: i64,
    jti: String,
    aud: &'a str,
    scope: &'static str,
    grant_types: [&'static str; 2],
    application_type: &'static str,
    id_token_signed_response_alg: Algorithm,
    request_object_signing_alg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_endpoint_auth_signing_alg: Option<Algorithm>,
    token_endpoint_auth_method: TokenEndpointAuthMethod,
    software_statement: &'a str,
    redirect_uris: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_types: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls_client_auth_subject_dn: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_signed_response_alg: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
}

/// Claim set of a client assertion (RFC 7523 section 3)
#[derive(Serialize)]
struct ClientAssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Builds and signs registration request JWTs for one token endpoint auth method.
#[derive(Clone)]
pub struct JwtSigner {
    pub(crate) signing_method: Algorithm,
    pub(crate) ssa: String,
    pub(crate) issuer: String,
    pub(crate) audience: String,
    pub(crate) kid: String,
    pub(crate) token_endpoint_auth_method: TokenEndpointAuthMethod,
    pub(crate) request_object_signing_alg: String,
    pub(crate) redirect_uris: Vec<String>,
    pub(crate) response_types: Vec<String>,
    pub(crate) signing_key: Option<Arc<EncodingKey>>,
    /// May be negative, which yields an already expired token.
    pub(crate) jwt_expiration: Duration,
    pub(crate) transport_cert_subject_dn: Option<String>,
    pub(crate) client_id: Option<String>,
    pub(crate) authorization_signed_response_alg: Option<String>,
}

impl JwtSigner {
    /// Signed registration request.
    pub fn claims(&self) -> Result<String, SigningError> {
        self.sign(None)
    }

    /// Signed registration update request, carrying the registered client id.
    pub fn update_claims(&self) -> Result<String, SigningError> {
        let client_id = self
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(SigningError::MissingClientId)?;
        self.sign(Some(client_id))
    }

    pub fn signing_method(&self) -> Algorithm {
        self.signing_method
    }

    pub fn signing_key(&self) -> Option<Arc<EncodingKey>> {
        self.signing_key.clone()
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn token_endpoint_auth_method(&self) -> TokenEndpointAuthMethod {
        self.token_endpoint_auth_method
    }

    fn sign(&self, client_id: Option<&str>) -> Result<String, SigningError> {
        let signing_key = self.signing_key.as_ref().ok_or(SigningError::MissingKey)?;

        let now = Utc::now();
        let token_endpoint_auth_signing_alg = match self.token_endpoint_auth_method {
            TokenEndpointAuthMethod::PrivateKeyJwt => Some(self.signing_method),
            TokenEndpointAuthMethod::ClientSecretJwt => Some(Algorithm::HS256),
            _ => None,
        };
        let tls_client_auth_subject_dn =
            if self.token_endpoint_auth_method == TokenEndpointAuthMethod::TlsClientAuth {
                self.transport_cert_subject_dn.as_deref()
            } else {
                None
            };

        let claims = RegistrationClaims {
            iss: &self.issuer,
            iat: now.timestamp(),
            exp: (now + self.jwt_expiration).timestamp(),
            jti: Uuid::new_v4().to_string(),
            aud: &self.audience,
            scope: REGISTRATION_SCOPE,
            grant_types: ["authorization_code", "client_credentials"],
            application_type: "web",
            id_token_signed_response_alg: self.signing_method,
            request_object_signing_alg: &self.request_object_signing_alg,
            token_endpoint_auth_signing_alg,
            token_endpoint_auth_method: self.token_endpoint_auth_method,
            software_statement: &self.ssa,
            redirect_uris: &self.redirect_uris,
            response_types: (!self.response_types.is_empty()).then_some(&self.response_types[..]),
            tls_client_auth_subject_dn,
            authorization_signed_response_alg: self.authorization_signed_response_alg.as_deref(),
            client_id,
        };

        let mut header = Header::new(self.signing_method);
        header.kid = Some(self.kid.clone());

        encode(&header, &claims, signing_key).map_err(|err| SigningError::EncodingFailed(err.to_string()))
    }
}

/// Sign a client assertion for authenticating at the token endpoint.
pub fn sign_client_assertion(
    client_id: &str,
    token_endpoint: &str,
    algorithm: Algorithm,
    kid: Option<&str>,
    key: &EncodingKey,
) -> Result<String, SigningError> {
    let now = Utc::now();
    let claims = ClientAssertionClaims {
        iss: client_id,
        sub: client_id,
        aud: token_endpoint,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(CLIENT_ASSERTION_LIFETIME_MINUTES)).timestamp(),
    };
    let mut header = Header::new(algorithm);
    header.kid = kid.map(str::to_string);

    encode(&header, &claims, key).map_err(|err| SigningError::EncodingFailed(err.to_string()))
}

/// Parse a PEM encoded RSA private key (PKCS#1 or PKCS#8).
pub fn signing_key_from_pem(pem: &[u8]) -> Result<EncodingKey, SigningError> {
    EncodingKey::from_rsa_pem(pem).map_err(|err| SigningError::MalformedKey(err.to_string()))
}

/// Generate a throwaway 2048 bit RSA signing key.
pub fn generate_rsa_signing_key() -> Result<EncodingKey, SigningError> {
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048)
        .map_err(|err| SigningError::KeyGenerationFailed(err.to_string()))?;
    let pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|err| SigningError::KeyGenerationFailed(err.to_string()))?;
    signing_key_from_pem(pem.as_bytes())
}


/// Decode the payload of a compact JWT without checking its signature.
#[cfg(test)]
pub(crate) fn decode_payload(token: &str) -> serde_json::Value {
    use base64::prelude::*;
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&BASE64_URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}
