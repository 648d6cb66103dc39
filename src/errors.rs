//! Standardized error types following the `error-dcr-<domain>-<number>` format.

use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when the configuration file cannot be read
    #[error("error-dcr-config-1 Unable to read config file '{0}': {1}")]
    FileUnreadable(String, std::io::Error),

    /// Error when the configuration file is not valid JSON
    #[error("error-dcr-config-2 Unable to json decode config file contents: {0}")]
    InvalidJson(serde_json::Error),

    /// Error when a required property is missing or empty
    #[error("error-dcr-config-3 Missing config property `{0}`")]
    PropertyRequired(String),

    /// Error when the specification version is not supported
    #[error("error-dcr-config-4 Missing or invalid config property Specification version `spec_version`: '{0}'")]
    UnsupportedSpecVersion(String),

    /// Error when version information is not available
    #[error("error-dcr-config-5 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when HTTP client timeout cannot be parsed
    #[error("error-dcr-config-6 Failed to parse HTTP client timeout '{0}': {1}")]
    TimeoutParsingFailed(String, String),

    /// Error when a JWT signing algorithm name is not recognised
    #[error("error-dcr-config-7 Unsupported signing algorithm '{0}'")]
    UnsupportedSigningAlgorithm(String),

    /// Error when the preferred token endpoint auth method is not recognised
    #[error("error-dcr-config-8 Unsupported token endpoint auth method '{0}'")]
    UnsupportedAuthMethod(String),

    /// Error when a URL property cannot be parsed
    #[error("error-dcr-config-9 Invalid URL in config property `{0}`: {1}")]
    InvalidUrl(String, String),
}

/// Execution context errors
#[derive(Debug, Error)]
pub enum ContextError {
    /// Requested key has never been written for this kind
    #[error("error-dcr-context-1 key not found in context: {0}")]
    NotFound(String),
}

/// JWT signing errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// No signing key configured
    #[error("error-dcr-signing-1 Signing key is missing")]
    MissingKey,

    /// Signing key could not be parsed
    #[error("error-dcr-signing-2 Signing key is malformed: {0}")]
    MalformedKey(String),

    /// Update claims require the registered client id
    #[error("error-dcr-signing-3 Client id is required for registration update claims")]
    MissingClientId,

    /// The JWT library refused to produce a token
    #[error("error-dcr-signing-4 Unable to sign JWT: {0}")]
    EncodingFailed(String),

    /// A compact JWT could not be decoded
    #[error("error-dcr-signing-5 Unable to decode JWT: {0}")]
    InvalidToken(String),

    /// Random key generation failed
    #[error("error-dcr-signing-6 Unable to generate RSA key: {0}")]
    KeyGenerationFailed(String),
}

/// Authoriser construction and usage errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Builder is missing the software statement assertion
    #[error("error-dcr-auth-1 missing ssa from authoriser")]
    MissingSsa,

    /// Builder is missing the key id
    #[error("error-dcr-auth-2 missing kid from authoriser")]
    MissingKeyId,

    /// Builder is missing the private signing key
    #[error("error-dcr-auth-3 missing privateKey from authoriser")]
    MissingPrivateKey,

    /// Builder is missing the token endpoint signing method
    #[error("error-dcr-auth-4 missing token endpoint signing method from authoriser")]
    MissingSigningMethod,

    /// None of the server's advertised methods is usable
    #[error("error-dcr-auth-5 no supported token endpoint auth method advertised by the server")]
    UnsupportedAuthMethod,

    /// Registration response could not be parsed into a client
    #[error("error-dcr-auth-6 Unable to parse registration response: {0}")]
    ParseError(String),

    /// Signing failure while producing claims
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Secured HTTP client construction errors
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// A root CA could not be parsed
    #[error("error-dcr-http-1 Unable to parse root CA certificate: {0}")]
    InvalidRootCa(String),

    /// The transport certificate/key pair could not be parsed
    #[error("error-dcr-http-2 Unable to parse transport key pair: {0}")]
    InvalidTransportKeyPair(String),

    /// The underlying client could not be built
    #[error("error-dcr-http-3 Unable to build HTTP client: {0}")]
    BuildFailed(String),
}

/// OpenID discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Well-known endpoint could not be reached
    #[error("error-dcr-discovery-1 Unable to call well-known endpoint {0}: {1}")]
    RequestFailed(String, String),

    /// Well-known endpoint returned a non 200 status
    #[error("error-dcr-discovery-2 Well-known endpoint {0} returned status {1}")]
    UnexpectedStatus(String, u16),

    /// Discovery document is not valid JSON or misses required fields
    #[error("error-dcr-discovery-3 Unable to decode openid configuration from {0}: {1}")]
    InvalidDocument(String, String),
}

/// Response schema validation errors
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document could not be compiled
    #[error("error-dcr-schema-1 Unable to compile schema: {0}")]
    CompilationFailed(String),

    /// Response body is not JSON
    #[error("error-dcr-schema-2 Response body is not valid JSON: {0}")]
    InvalidJson(String),

    /// Response body violates the schema
    #[error("error-dcr-schema-3 Response does not match schema: {}", .0.join("; "))]
    Violations(Vec<String>),
}

/// Manifest construction errors; these abort the run before any HTTP traffic
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The happy path authoriser could not be built
    #[error("error-dcr-manifest-1 Invalid authoriser configuration: {0}")]
    InvalidAuthoriser(AuthError),

    /// A scenario factory failed to prepare its inputs
    #[error("error-dcr-manifest-2 Unable to prepare scenario {0}: {1}")]
    ScenarioFactoryFailed(String, SigningError),
}

/// Report sink errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the report failed
    #[error("error-dcr-report-1 Unable to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// Serializing the report failed
    #[error("error-dcr-report-2 Unable to serialize report: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Tester errors
#[derive(Debug, Error)]
pub enum TesterError {
    /// The filter excluded every scenario of the manifest
    #[error("error-dcr-tester-1 No scenarios match filter '{0}'")]
    NoScenariosSelected(String),

    /// A report sink failed
    #[error(transparent)]
    Report(#[from] ReportError),
}
