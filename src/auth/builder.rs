//! Immutable authoriser configuration.

use chrono::Duration;
use jsonwebtoken::{Algorithm, EncodingKey};
use std::sync::Arc;

use super::{Authoriser, JwtSigner, select_auth_method};
use crate::errors::AuthError;
use crate::oauth::openid::Configuration;
use crate::oauth::types::TokenEndpointAuthMethod;

/// Default lifetime of registration request JWTs.
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 1;

/// Fluent authoriser configuration.
///
/// Every `with_*` call returns a new builder and leaves `self` untouched, so
/// one happy path builder can be derived into many variations.
#[derive(Clone)]
pub struct AuthoriserBuilder {
    config: Configuration,
    ssa: String,
    issuer: String,
    aud: Option<String>,
    kid: String,
    signing_method: Option<Algorithm>,
    redirect_uris: Vec<String>,
    response_types: Vec<String>,
    private_key: Option<Arc<EncodingKey>>,
    jwt_expiration: Duration,
    transport_cert_subject_dn: Option<String>,
    preferred_auth_method: Option<TokenEndpointAuthMethod>,
    client_id: Option<String>,
    authorization_signed_response_alg: Option<String>,
}

impl Default for AuthoriserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthoriserBuilder {
    pub fn new() -> Self {
        Self {
            config: Configuration::default(),
            ssa: String::new(),
            issuer: String::new(),
            aud: None,
            kid: String::new(),
            signing_method: None,
            redirect_uris: Vec::new(),
            response_types: Vec::new(),
            private_key: None,
            jwt_expiration: Duration::hours(DEFAULT_JWT_EXPIRATION_HOURS),
            transport_cert_subject_dn: None,
            preferred_auth_method: None,
            client_id: None,
            authorization_signed_response_alg: None,
        }
    }

    fn derive(&self, apply: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        apply(&mut next);
        next
    }

    pub fn with_openid_config(&self, config: Configuration) -> Self {
        self.derive(|b| b.config = config)
    }

    pub fn with_ssa(&self, ssa: impl Into<String>) -> Self {
        let ssa = ssa.into();
        self.derive(|b| b.ssa = ssa)
    }

    pub fn with_issuer(&self, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        self.derive(|b| b.issuer = issuer)
    }

    /// Audience of the registration JWT; defaults to the discovered issuer.
    pub fn with_aud(&self, aud: impl Into<String>) -> Self {
        let aud = aud.into();
        self.derive(|b| b.aud = Some(aud))
    }

    pub fn with_kid(&self, kid: impl Into<String>) -> Self {
        let kid = kid.into();
        self.derive(|b| b.kid = kid)
    }

    pub fn with_token_endpoint_signing_method(&self, method: Algorithm) -> Self {
        self.derive(|b| b.signing_method = Some(method))
    }

    pub fn with_redirect_uris(&self, redirect_uris: Vec<String>) -> Self {
        self.derive(|b| b.redirect_uris = redirect_uris)
    }

    pub fn with_response_types(&self, response_types: Vec<String>) -> Self {
        self.derive(|b| b.response_types = response_types)
    }

    pub fn with_private_key(&self, key: Arc<EncodingKey>) -> Self {
        self.derive(|b| b.private_key = Some(key))
    }

    /// Lifetime of the registration JWT; negative values produce expired tokens.
    pub fn with_jwt_expiration(&self, expiration: Duration) -> Self {
        self.derive(|b| b.jwt_expiration = expiration)
    }

    pub fn with_transport_cert_subject_dn(&self, dn: impl Into<String>) -> Self {
        let dn = dn.into();
        self.derive(|b| b.transport_cert_subject_dn = Some(dn))
    }

    pub fn with_preferred_token_endpoint_auth_method(&self, method: TokenEndpointAuthMethod) -> Self {
        self.derive(|b| b.preferred_auth_method = Some(method))
    }

    pub fn with_client_id(&self, client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        self.derive(|b| b.client_id = Some(client_id))
    }

    pub fn with_authorization_signed_response_alg(&self, alg: impl Into<String>) -> Self {
        let alg = alg.into();
        self.derive(|b| b.authorization_signed_response_alg = Some(alg))
    }

    pub fn openid_config(&self) -> &Configuration {
        &self.config
    }

    /// Validate the configuration and select the authoriser variant.
    ///
    /// Returns [`Authoriser::None`] when the server advertises no usable
    /// method; that surfaces later as a failing claims step.
    pub fn build(&self) -> Result<Authoriser, AuthError> {
        if self.ssa.is_empty() {
            return Err(AuthError::MissingSsa);
        }
        if self.kid.is_empty() {
            return Err(AuthError::MissingKeyId);
        }
        let signing_key = self.private_key.clone().ok_or(AuthError::MissingPrivateKey)?;
        let signing_method = self.signing_method.ok_or(AuthError::MissingSigningMethod)?;

        let Some(method) = select_auth_method(
            &self.config.token_endpoint_auth_methods_supported,
            self.preferred_auth_method,
        ) else {
            tracing::warn!(
                supported = ?self.config.token_endpoint_auth_methods_supported,
                "no supported token endpoint auth method advertised"
            );
            return Ok(Authoriser::None);
        };

        let signer = JwtSigner {
            signing_method,
            ssa: self.ssa.clone(),
            issuer: self.issuer.clone(),
            audience: self.aud.clone().unwrap_or_else(|| self.config.issuer.clone()),
            kid: self.kid.clone(),
            token_endpoint_auth_method: method,
            request_object_signing_alg: self.config.request_object_signing_alg(),
            redirect_uris: self.redirect_uris.clone(),
            response_types: self.response_types.clone(),
            signing_key: Some(signing_key),
            jwt_expiration: self.jwt_expiration,
            transport_cert_subject_dn: self.transport_cert_subject_dn.clone(),
            client_id: self.client_id.clone(),
            authorization_signed_response_alg: self.authorization_signed_response_alg.clone(),
        };

        Ok(Authoriser::for_method(
            method,
            self.config.token_endpoint.clone(),
            signer,
        ))
    }
}
