//! Software client issued by the registration endpoint.

use jsonwebtoken::{Algorithm, EncodingKey};
use std::fmt;
use std::sync::Arc;

use crate::auth::signer::{REGISTRATION_SCOPE, sign_client_assertion};
use crate::errors::SigningError;
use crate::oauth::types::TokenEndpointAuthMethod;

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// How the client proves its identity at the token endpoint.
#[derive(Clone)]
pub enum ClientCredentials {
    /// Identity comes from the mTLS transport certificate
    TlsClientAuth,
    /// Client assertion signed with the registration signing key
    PrivateKeyJwt {
        signing_key: Arc<EncodingKey>,
        algorithm: Algorithm,
        kid: String,
    },
    /// Client assertion signed HS256 with the issued secret
    ClientSecretJwt { secret: String },
    /// HTTP Basic with the issued secret
    ClientSecretBasic { secret: String },
}

impl ClientCredentials {
    pub fn auth_method(&self) -> TokenEndpointAuthMethod {
        match self {
            ClientCredentials::TlsClientAuth => TokenEndpointAuthMethod::TlsClientAuth,
            ClientCredentials::PrivateKeyJwt { .. } => TokenEndpointAuthMethod::PrivateKeyJwt,
            ClientCredentials::ClientSecretJwt { .. } => TokenEndpointAuthMethod::ClientSecretJwt,
            ClientCredentials::ClientSecretBasic { .. } => {
                TokenEndpointAuthMethod::ClientSecretBasic
            }
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCredentials::PrivateKeyJwt { algorithm, kid, .. } => f
                .debug_struct("PrivateKeyJwt")
                .field("algorithm", algorithm)
                .field("kid", kid)
                .finish_non_exhaustive(),
            other => write!(f, "{}", other.auth_method()),
        }
    }
}

/// A registered software client.
#[derive(Debug, Clone)]
pub struct Client {
    id: String,
    registration_access_token: String,
    registration_client_uri: Option<String>,
    credentials: ClientCredentials,
}

impl Client {
    pub fn new(
        id: impl Into<String>,
        registration_access_token: impl Into<String>,
        registration_client_uri: Option<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            id: id.into(),
            registration_access_token: registration_access_token.into(),
            registration_client_uri,
            credentials,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registration_access_token(&self) -> &str {
        &self.registration_access_token
    }

    pub fn registration_client_uri(&self) -> Option<&str> {
        self.registration_client_uri.as_deref()
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Copy of this client with fields refreshed from a retrieve response.
    pub fn refreshed(&self, registration_client_uri: Option<String>, secret: Option<String>) -> Self {
        let credentials = match (&self.credentials, secret) {
            (ClientCredentials::ClientSecretJwt { .. }, Some(secret)) => {
                ClientCredentials::ClientSecretJwt { secret }
            }
            (ClientCredentials::ClientSecretBasic { .. }, Some(secret)) => {
                ClientCredentials::ClientSecretBasic { secret }
            }
            (credentials, _) => credentials.clone(),
        };
        Self {
            id: self.id.clone(),
            registration_access_token: self.registration_access_token.clone(),
            registration_client_uri: registration_client_uri
                .or_else(|| self.registration_client_uri.clone()),
            credentials,
        }
    }

    /// Client credentials grant request authenticated with this client's method.
    pub fn credentials_grant_request(
        &self,
        http_client: &reqwest::Client,
        token_endpoint: &str,
    ) -> Result<reqwest::RequestBuilder, SigningError> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("scope", REGISTRATION_SCOPE.to_string()),
        ];
        let request = http_client.post(token_endpoint);

        let request = match &self.credentials {
            ClientCredentials::TlsClientAuth => {
                form.push(("client_id", self.id.clone()));
                request
            }
            ClientCredentials::PrivateKeyJwt {
                signing_key,
                algorithm,
                kid,
            } => {
                let assertion = sign_client_assertion(
                    &self.id,
                    token_endpoint,
                    *algorithm,
                    Some(kid),
                    signing_key,
                )?;
                form.push(("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()));
                form.push(("client_assertion", assertion));
                request
            }
            ClientCredentials::ClientSecretJwt { secret } => {
                let key = EncodingKey::from_secret(secret.as_bytes());
                let assertion =
                    sign_client_assertion(&self.id, token_endpoint, Algorithm::HS256, None, &key)?;
                form.push(("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()));
                form.push(("client_assertion", assertion));
                request
            }
            ClientCredentials::ClientSecretBasic { secret } => {
                request.basic_auth(&self.id, Some(secret))
            }
        };

        Ok(request.form(&form))
    }
}
