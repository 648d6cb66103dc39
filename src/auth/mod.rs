//! Registration authorisers: one per token endpoint auth method.
//!
//! An [`Authoriser`] produces the signed registration request for its method
//! and turns a successful registration response into a [`Client`] carrying
//! the matching credentials.

pub mod builder;
pub mod signer;

pub use builder::AuthoriserBuilder;
pub use signer::JwtSigner;

use crate::errors::AuthError;
use crate::oauth::clients::{Client, ClientCredentials};
use crate::oauth::types::{ClientRegistrationResponse, TokenEndpointAuthMethod};

/// Pick the auth method to register with.
///
/// A preferred method wins when the server advertises it. Otherwise the
/// first advertised method in [`TokenEndpointAuthMethod::PRECEDENCE`] order.
pub fn select_auth_method(
    supported: &[String],
    preferred: Option<TokenEndpointAuthMethod>,
) -> Option<TokenEndpointAuthMethod> {
    let advertised = |method: &TokenEndpointAuthMethod| supported.iter().any(|s| s == method.as_str());

    if let Some(preferred) = preferred.filter(advertised) {
        return Some(preferred);
    }
    if preferred.is_some() {
        tracing::debug!(
            ?preferred,
            "preferred token endpoint auth method not advertised, falling back to precedence"
        );
    }

    TokenEndpointAuthMethod::PRECEDENCE
        .into_iter()
        .find(|method| advertised(method))
}

/// Produces registration request JWTs and parses registration responses.
#[derive(Clone)]
pub enum Authoriser {
    TlsClientAuth {
        token_endpoint: String,
        signer: JwtSigner,
    },
    ClientPrivateKeyJwt {
        token_endpoint: String,
        signer: JwtSigner,
    },
    ClientSecretJwt {
        token_endpoint: String,
        signer: JwtSigner,
    },
    ClientSecretBasic {
        token_endpoint: String,
        signer: JwtSigner,
    },
    /// The server advertises no method we can drive
    None,
}

impl Authoriser {
    pub(crate) fn for_method(
        method: TokenEndpointAuthMethod,
        token_endpoint: String,
        signer: JwtSigner,
    ) -> Self {
        match method {
            TokenEndpointAuthMethod::TlsClientAuth => Authoriser::TlsClientAuth {
                token_endpoint,
                signer,
            },
            TokenEndpointAuthMethod::PrivateKeyJwt => Authoriser::ClientPrivateKeyJwt {
                token_endpoint,
                signer,
            },
            TokenEndpointAuthMethod::ClientSecretJwt => Authoriser::ClientSecretJwt {
                token_endpoint,
                signer,
            },
            TokenEndpointAuthMethod::ClientSecretBasic => Authoriser::ClientSecretBasic {
                token_endpoint,
                signer,
            },
        }
    }

    /// Auth method this authoriser registers with, `None` for [`Authoriser::None`].
    pub fn method(&self) -> Option<TokenEndpointAuthMethod> {
        self.signer().map(JwtSigner::token_endpoint_auth_method)
    }

    pub fn token_endpoint(&self) -> Option<&str> {
        match self {
            Authoriser::TlsClientAuth { token_endpoint, .. }
            | Authoriser::ClientPrivateKeyJwt { token_endpoint, .. }
            | Authoriser::ClientSecretJwt { token_endpoint, .. }
            | Authoriser::ClientSecretBasic { token_endpoint, .. } => Some(token_endpoint),
            Authoriser::None => None,
        }
    }

    fn signer(&self) -> Option<&JwtSigner> {
        match self {
            Authoriser::TlsClientAuth { signer, .. }
            | Authoriser::ClientPrivateKeyJwt { signer, .. }
            | Authoriser::ClientSecretJwt { signer, .. }
            | Authoriser::ClientSecretBasic { signer, .. } => Some(signer),
            Authoriser::None => None,
        }
    }

    /// Signed registration request JWT.
    pub fn claims(&self) -> Result<String, AuthError> {
        let signer = self.signer().ok_or(AuthError::UnsupportedAuthMethod)?;
        Ok(signer.claims()?)
    }

    /// Signed registration update request JWT; the authoriser must carry a client id.
    pub fn update_claims(&self) -> Result<String, AuthError> {
        let signer = self.signer().ok_or(AuthError::UnsupportedAuthMethod)?;
        Ok(signer.update_claims()?)
    }

    /// Parse a registration response body into a client for this auth method.
    pub fn client(&self, body: &[u8]) -> Result<Client, AuthError> {
        let signer = self.signer().ok_or(AuthError::UnsupportedAuthMethod)?;
        let response: ClientRegistrationResponse =
            serde_json::from_slice(body).map_err(|err| AuthError::ParseError(err.to_string()))?;

        if response.client_id.is_empty() {
            return Err(AuthError::ParseError("client_id is empty".to_string()));
        }

        let require_secret = |secret: Option<String>| {
            secret
                .filter(|secret| !secret.is_empty())
                .ok_or_else(|| AuthError::ParseError("client_secret is missing".to_string()))
        };

        let credentials = match self {
            Authoriser::TlsClientAuth { .. } => ClientCredentials::TlsClientAuth,
            Authoriser::ClientPrivateKeyJwt { .. } => ClientCredentials::PrivateKeyJwt {
                signing_key: signer
                    .signing_key()
                    .ok_or(AuthError::MissingPrivateKey)?,
                algorithm: signer.signing_method(),
                kid: signer.kid().to_string(),
            },
            Authoriser::ClientSecretJwt { .. } => ClientCredentials::ClientSecretJwt {
                secret: require_secret(response.client_secret)?,
            },
            Authoriser::ClientSecretBasic { .. } => ClientCredentials::ClientSecretBasic {
                secret: require_secret(response.client_secret)?,
            },
            Authoriser::None => return Err(AuthError::UnsupportedAuthMethod),
        };

        Ok(Client::new(
            response.client_id,
            response.registration_access_token,
            response.registration_client_uri,
            credentials,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signer::test_keys;
    use crate::oauth::openid::Configuration;
    use jsonwebtoken::Algorithm;

    fn methods(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn authoriser(method: &str) -> Authoriser {
        AuthoriserBuilder::new()
            .with_openid_config(Configuration {
                issuer: "https://as.example.com".to_string(),
                token_endpoint: "https://as.example.com/token".to_string(),
                token_endpoint_auth_methods_supported: methods(&[method]),
                ..Default::default()
            })
            .with_ssa("ssa")
            .with_kid("kid")
            .with_issuer("issuer")
            .with_token_endpoint_signing_method(Algorithm::PS256)
            .with_private_key(test_keys::key_pair().encoding.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_select_follows_precedence() {
        let supported = methods(&["client_secret_basic", "private_key_jwt", "tls_client_auth"]);
        assert_eq!(
            select_auth_method(&supported, None),
            Some(TokenEndpointAuthMethod::TlsClientAuth)
        );

        let supported = methods(&["client_secret_basic", "client_secret_jwt"]);
        assert_eq!(
            select_auth_method(&supported, None),
            Some(TokenEndpointAuthMethod::ClientSecretJwt)
        );
    }

    #[test]
    fn test_select_prefers_advertised_preference() {
        let supported = methods(&["tls_client_auth", "client_secret_basic"]);
        assert_eq!(
            select_auth_method(&supported, Some(TokenEndpointAuthMethod::ClientSecretBasic)),
            Some(TokenEndpointAuthMethod::ClientSecretBasic)
        );
    }

    #[test]
    fn test_select_ignores_unadvertised_preference() {
        let supported = methods(&["private_key_jwt"]);
        assert_eq!(
            select_auth_method(&supported, Some(TokenEndpointAuthMethod::TlsClientAuth)),
            Some(TokenEndpointAuthMethod::PrivateKeyJwt)
        );
    }

    #[test]
    fn test_select_nothing_usable() {
        assert_eq!(select_auth_method(&methods(&["client_secret_post"]), None), None);
        assert_eq!(select_auth_method(&[], None), None);
    }

    #[test]
    fn test_client_secret_jwt_client_from_response() {
        let authoriser = authoriser("client_secret_jwt");
        assert_eq!(authoriser.method(), Some(TokenEndpointAuthMethod::ClientSecretJwt));

        let client = authoriser
            .client(br#"{"client_id":"12345","registration_access_token":"abcdef","client_secret":"54321"}"#)
            .unwrap();

        assert_eq!(client.id(), "12345");
        assert_eq!(client.registration_access_token(), "abcdef");
        assert!(matches!(
            client.credentials(),
            ClientCredentials::ClientSecretJwt { secret } if secret == "54321"
        ));
    }

    #[test]
    fn test_secret_methods_require_client_secret() {
        let authoriser = authoriser("client_secret_basic");
        let result = authoriser.client(br#"{"client_id":"12345","registration_access_token":"abcdef"}"#);
        assert!(matches!(result, Err(AuthError::ParseError(_))));
    }

    #[test]
    fn test_client_rejects_malformed_body() {
        let authoriser = authoriser("private_key_jwt");
        assert!(matches!(authoriser.client(b"not json"), Err(AuthError::ParseError(_))));
        assert!(matches!(
            authoriser.client(br#"{"registration_access_token":"abcdef"}"#),
            Err(AuthError::ParseError(_))
        ));
    }

    #[test]
    fn test_client_requires_registration_access_token() {
        for method in ["tls_client_auth", "private_key_jwt", "client_secret_basic"] {
            let result = authoriser(method)
                .client(br#"{"client_id":"12345","client_secret":"54321"}"#);
            assert!(
                matches!(&result, Err(AuthError::ParseError(reason)) if reason.contains("registration_access_token")),
                "{}: {:?}",
                method,
                result.map(|client| client.id().to_string())
            );
        }
    }

    #[test]
    fn test_private_key_jwt_client_uses_signing_key() {
        let client = authoriser("private_key_jwt")
            .client(br#"{"client_id":"12345","registration_access_token":"abcdef"}"#)
            .unwrap();
        assert!(matches!(
            client.credentials(),
            ClientCredentials::PrivateKeyJwt { algorithm: Algorithm::PS256, kid, .. } if kid == "kid"
        ));
    }

    #[test]
    fn test_none_authoriser_refuses_everything() {
        let authoriser = Authoriser::None;
        assert_eq!(authoriser.method(), None);
        assert!(matches!(authoriser.claims(), Err(AuthError::UnsupportedAuthMethod)));
        assert!(matches!(authoriser.client(b"{}"), Err(AuthError::UnsupportedAuthMethod)));
    }
}
