//! Conformance run configuration: a JSON file plus a few environment knobs.

use anyhow::Result;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::oauth::types::TokenEndpointAuthMethod;

/// Specification versions this tool can test against
pub const SUPPORTED_SPEC_VERSIONS: [&str; 1] = ["3.2"];

/// Specification version the conformance manifest targets
#[derive(Clone, Debug, PartialEq)]
pub struct SpecVersion(String);

/// HTTP client timeout configuration
#[derive(Clone, Debug)]
pub struct HttpClientTimeout(Duration);

/// Token endpoint / registration JWT signing algorithm
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SigningAlgorithm(Algorithm);

/// Response types requested at registration
#[derive(Clone, Debug)]
pub struct ResponseTypes(Vec<String>);

/// Configuration file contents before validation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    spec_version: String,
    wellknown_endpoint: String,
    ssa: String,
    kid: String,
    aud: String,
    redirect_uris: Vec<String>,
    issuer: String,
    private_key: String,
    transport_root_cas: Vec<String>,
    transport_cert_subject_dn: String,
    transport_cert: String,
    transport_key: String,
    get_implemented: bool,
    put_implemented: bool,
    delete_implemented: bool,
    environment: String,
    brand: String,
    preferred_token_endpoint_auth_method: String,
    create_software_client_only: bool,
    authorization_signed_response_alg: String,
    token_endpoint_signing_alg: String,
    response_types: Vec<String>,
}

/// Validated conformance run configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub spec_version: SpecVersion,
    pub wellknown_endpoint: String,
    pub ssa: String,
    pub kid: String,
    pub aud: Option<String>,
    pub redirect_uris: Vec<String>,
    pub issuer: String,
    pub private_key: String,
    pub transport_root_cas: Vec<String>,
    pub transport_cert_subject_dn: Option<String>,
    pub transport_cert: String,
    pub transport_key: String,
    pub get_implemented: bool,
    pub put_implemented: bool,
    pub delete_implemented: bool,
    pub environment: String,
    pub brand: String,
    pub preferred_token_endpoint_auth_method: Option<TokenEndpointAuthMethod>,
    pub create_software_client_only: bool,
    pub authorization_signed_response_alg: Option<String>,
    pub token_endpoint_signing_alg: SigningAlgorithm,
    pub response_types: ResponseTypes,
    pub http_client_timeout: HttpClientTimeout,
    pub user_agent: String,
}

impl Config {
    /// Read, decode and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path)
            .map_err(|err| ConfigError::FileUnreadable(path.display().to_string(), err))?;
        Self::from_slice(&contents)
    }

    /// Decode and validate configuration file contents.
    pub fn from_slice(contents: &[u8]) -> Result<Self> {
        let raw: RawConfig = serde_json::from_slice(contents).map_err(ConfigError::InvalidJson)?;

        let spec_version: SpecVersion = raw.spec_version.try_into()?;
        let wellknown_endpoint = required(raw.wellknown_endpoint, "wellknown_endpoint")?;
        url::Url::parse(&wellknown_endpoint).map_err(|err| {
            ConfigError::InvalidUrl("wellknown_endpoint".to_string(), err.to_string())
        })?;
        let environment = required(raw.environment, "environment")?;
        let brand = required(raw.brand, "brand")?;

        let preferred_token_endpoint_auth_method = non_empty(raw.preferred_token_endpoint_auth_method)
            .map(|value| {
                TokenEndpointAuthMethod::from_str(&value).map_err(ConfigError::UnsupportedAuthMethod)
            })
            .transpose()?;
        let token_endpoint_signing_alg: SigningAlgorithm = raw.token_endpoint_signing_alg.try_into()?;
        let response_types: ResponseTypes = raw.response_types.into();

        let http_client_timeout: HttpClientTimeout =
            default_env("DCR_HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let default_user_agent = format!("dcr-conformance/{}", version()?);
        let user_agent = default_env("DCR_USER_AGENT", &default_user_agent);

        Ok(Self {
            version: version()?,
            spec_version,
            wellknown_endpoint,
            ssa: raw.ssa,
            kid: raw.kid,
            aud: non_empty(raw.aud),
            redirect_uris: raw.redirect_uris,
            issuer: raw.issuer,
            private_key: raw.private_key,
            transport_root_cas: raw.transport_root_cas,
            transport_cert_subject_dn: non_empty(raw.transport_cert_subject_dn),
            transport_cert: raw.transport_cert,
            transport_key: raw.transport_key,
            get_implemented: raw.get_implemented,
            put_implemented: raw.put_implemented,
            delete_implemented: raw.delete_implemented,
            environment,
            brand,
            preferred_token_endpoint_auth_method,
            create_software_client_only: raw.create_software_client_only,
            authorization_signed_response_alg: non_empty(raw.authorization_signed_response_alg),
            token_endpoint_signing_alg,
            response_types,
            http_client_timeout,
            user_agent,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

fn required(value: String, name: &str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::PropertyRequired(name.to_string()))
    } else {
        Ok(value)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

impl TryFrom<String> for SpecVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if SUPPORTED_SPEC_VERSIONS.contains(&value.as_str()) {
            Ok(Self(value))
        } else {
            Err(ConfigError::UnsupportedSpecVersion(value))
        }
    }
}

impl AsRef<str> for SpecVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(10)));
        }
        duration_str::parse(&value)
            .map(Self)
            .map_err(|err| ConfigError::TimeoutParsingFailed(value, err.to_string()))
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl TryFrom<String> for SigningAlgorithm {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Algorithm::PS256));
        }
        match Algorithm::from_str(&value) {
            Ok(alg @ (Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512)) => Ok(Self(alg)),
            Ok(alg @ (Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512)) => Ok(Self(alg)),
            _ => Err(ConfigError::UnsupportedSigningAlgorithm(value)),
        }
    }
}

impl AsRef<Algorithm> for SigningAlgorithm {
    fn as_ref(&self) -> &Algorithm {
        &self.0
    }
}

impl From<Vec<String>> for ResponseTypes {
    fn from(value: Vec<String>) -> Self {
        let value: Vec<String> = value.into_iter().filter(|s| !s.trim().is_empty()).collect();
        if value.is_empty() {
            Self(vec!["code id_token".to_string()])
        } else {
            Self(value)
        }
    }
}

impl AsRef<Vec<String>> for ResponseTypes {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}
