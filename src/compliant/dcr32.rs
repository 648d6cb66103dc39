//! Dynamic Client Registration 3.2 conformance manifest.

use base64::prelude::*;
use chrono::Duration;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;

use super::manifest::Manifest;
use super::scenario::{Scenario, ScenarioBuilder};
use super::schema::SchemaValidator;
use super::test_case::{TestCase, TestCaseBuilder};
use crate::auth::AuthoriserBuilder;
use crate::auth::signer::generate_rsa_signing_key;
use crate::errors::{ManifestError, SigningError};
use crate::oauth::openid::Configuration;

pub const MANIFEST_NAME: &str = "DCR32";
pub const MANIFEST_VERSION: &str = "1.0";

const SPEC_LINK_DISCOVERY: &str = "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/1078034771/Dynamic+Client+Registration+-+v3.2#DynamicClientRegistration-v3.2-Discovery";
const SPEC_LINK_REGISTER_SOFTWARE: &str = "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/1078034771/Dynamic+Client+Registration+-+v3.2#DynamicClientRegistration-v3.2-POST/register";
const SPEC_LINK_DELETE_SOFTWARE: &str = "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/1078034771/Dynamic+Client+Registration+-+v3.2#DynamicClientRegistration-v3.2-DELETE/register/{ClientId}";
const SPEC_LINK_RETRIEVE_SOFTWARE: &str = "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/1078034771/Dynamic+Client+Registration+-+v3.2#DynamicClientRegistration-v3.2-GET/register/{ClientId}";
const SPEC_LINK_UPDATE_SOFTWARE: &str = "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/1078034771/Dynamic+Client+Registration+-+v3.2#DynamicClientRegistration-v3.2-PUT/register/{ClientId}";

/// Inputs shared by every DCR 3.2 scenario.
#[derive(Clone)]
pub struct Dcr32Config {
    pub openid_config: Configuration,
    pub secure_client: reqwest::Client,
    pub authoriser_builder: AuthoriserBuilder,
    pub schema_validator: Arc<dyn SchemaValidator>,
    pub ssa: String,
    pub get_implemented: bool,
    pub put_implemented: bool,
    pub delete_implemented: bool,
}

impl Dcr32Config {
    fn registration_endpoint(&self) -> String {
        self.openid_config.registration_endpoint_as_string()
    }

    fn token_endpoint(&self) -> &str {
        &self.openid_config.token_endpoint
    }

    fn test_case(&self, name: &str) -> TestCaseBuilder {
        TestCaseBuilder::new(name).with_http_client(self.secure_client.clone())
    }
}

/// Validate the happy path configuration before any scenario is assembled.
fn validate(cfg: &Dcr32Config) -> Result<(), ManifestError> {
    cfg.authoriser_builder
        .build()
        .map(|_| ())
        .map_err(ManifestError::InvalidAuthoriser)
}

/// The full DCR 3.2 manifest.
pub fn new_dcr32(cfg: &Dcr32Config) -> Result<Manifest, ManifestError> {
    validate(cfg)?;

    let random_key = generate_rsa_signing_key()
        .map(Arc::new)
        .map_err(|err| ManifestError::ScenarioFactoryFailed("DCR-012".to_string(), err))?;
    new_dcr32_with_key(cfg, random_key)
}

/// The full manifest, signing the invalid signature cases with `random_key`.
pub fn new_dcr32_with_key(
    cfg: &Dcr32Config,
    random_key: Arc<EncodingKey>,
) -> Result<Manifest, ManifestError> {
    validate(cfg)?;

    let scenarios = vec![
        validate_oidc_config_registration_url(cfg),
        create_software_client(cfg),
        delete_software_client(cfg),
        create_invalid_registration_request(cfg),
        retrieve_software_client(cfg),
        retrieve_with_invalid_credentials(cfg),
        update_software_client(cfg),
        update_software_client_with_wrong_id(cfg),
        retrieve_software_client_wrong_id(cfg),
        register_software_wrong_response_type(cfg),
        registration_request_invalid_signature(cfg, random_key.clone()),
        register_invalid_software_statement_signing(cfg, &random_key)
            .map_err(|err| ManifestError::ScenarioFactoryFailed("DCR-013".to_string(), err))?,
    ];

    Ok(Manifest::new(MANIFEST_NAME, MANIFEST_VERSION, scenarios))
}

/// Manifest that only registers (and cleans up) one software client.
pub fn new_create_software_client_only(cfg: &Dcr32Config) -> Result<Manifest, ManifestError> {
    validate(cfg)?;
    Ok(Manifest::new(
        MANIFEST_NAME,
        MANIFEST_VERSION,
        vec![create_software_client(cfg)],
    ))
}

fn skipped(reason: &str, name: &str) -> String {
    format!("(SKIP {} endpoint not implemented) {}", reason, name)
}

fn validate_oidc_config_registration_url(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-001",
        "Validate OIDC Config Registration URL",
        SPEC_LINK_DISCOVERY,
    )
    .test_case(
        TestCaseBuilder::new("Validate Registration URL")
            .validate_registration_endpoint(cfg.openid_config.registration_endpoint.clone())
            .build(),
    )
    .build()
}

/// Register a client, then obtain a client credentials grant with it.
fn create_software_client_test_cases(cfg: &Dcr32Config) -> Vec<TestCase> {
    vec![
        cfg.test_case("Register software client")
            .generate_signed_claims(cfg.authoriser_builder.clone())
            .post_client_register(cfg.registration_endpoint())
            .output_transaction_id()
            .assert_status_code_created()
            .parse_client_register_response(cfg.authoriser_builder.clone())
            .build(),
        cfg.test_case("Retrieve client credentials grant")
            .get_client_credentials_grant(cfg.token_endpoint())
            .build(),
    ]
}

fn delete_software_client_test_case(cfg: &Dcr32Config) -> TestCase {
    let name = "Delete software client";
    if !cfg.delete_implemented {
        return TestCase::new(skipped("Delete", name), Vec::new());
    }
    cfg.test_case(name)
        .client_delete(cfg.registration_endpoint())
        .build()
}

fn retrieve_software_client_test_case(cfg: &Dcr32Config) -> TestCase {
    let name = "Retrieve software client";
    if !cfg.get_implemented {
        return TestCase::new(skipped("Get", name), Vec::new());
    }
    cfg.test_case(name)
        .client_retrieve(cfg.registration_endpoint())
        .assert_status_code_ok()
        .assert_valid_schema_response(cfg.schema_validator.clone())
        .parse_client_retrieve_response()
        .build()
}

fn create_software_client(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-002",
        "Dynamically create a new software client",
        SPEC_LINK_REGISTER_SOFTWARE,
    )
    .test_cases(create_software_client_test_cases(cfg))
    .test_case(delete_software_client_test_case(cfg))
    .build()
}

fn delete_software_client(cfg: &Dcr32Config) -> Scenario {
    let id = "DCR-003";
    let name = "Delete software is supported";
    if !cfg.delete_implemented {
        return ScenarioBuilder::new(id, skipped("Delete", name), SPEC_LINK_DELETE_SOFTWARE).build();
    }

    ScenarioBuilder::new(id, name, SPEC_LINK_DELETE_SOFTWARE)
        .test_cases(create_software_client_test_cases(cfg))
        .test_case(delete_software_client_test_case(cfg))
        .test_case(
            cfg.test_case("Retrieve delete software client should fail")
                .client_retrieve(cfg.registration_endpoint())
                .assert_status_code_unauthorized()
                .build(),
        )
        .build()
}

fn create_invalid_registration_request(cfg: &Dcr32Config) -> Scenario {
    let builder = &cfg.authoriser_builder;
    let invalid_registration = |name: &str, builder: AuthoriserBuilder| {
        cfg.test_case(name)
            .generate_signed_claims(builder)
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_bad_request()
    };

    ScenarioBuilder::new(
        "DCR-004",
        "Dynamically create a new software client will fail on invalid registration request",
        SPEC_LINK_REGISTER_SOFTWARE,
    )
    .test_case(
        invalid_registration(
            "Register software client fails on expired claims",
            builder.with_jwt_expiration(-Duration::hours(1)),
        )
        .assert_error_message("invalid_client_metadata", "")
        .build(),
    )
    .test_case(
        invalid_registration(
            "Register software client fails on invalid issuer",
            builder.with_issuer("foo.is/invalid"),
        )
        .build(),
    )
    .test_case(
        invalid_registration(
            "Register software client fails on invalid issuer too short",
            builder.with_issuer(""),
        )
        .build(),
    )
    .test_case(
        invalid_registration(
            "Register software client fails on invalid issuer too long",
            builder.with_issuer("123456789012345678901234567890"),
        )
        .build(),
    )
    .test_case(
        invalid_registration(
            "Register software client will fail with token endpoint auth method RS256",
            builder.with_token_endpoint_signing_method(Algorithm::RS256),
        )
        .build(),
    )
    .test_case(
        invalid_registration(
            "Register software client fails on redirect_uri not in software_redirect_uris",
            builder.with_redirect_uris(vec!["https://abc.com".to_string()]),
        )
        .assert_error_message(
            "invalid_redirect_uri",
            "invalid registration request redirect_uris value, must match or be a subset of the software_redirect_uris",
        )
        .build(),
    )
    .build()
}

fn retrieve_software_client(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-005",
        "Dynamically retrieve a new software client",
        SPEC_LINK_RETRIEVE_SOFTWARE,
    )
    .test_cases(create_software_client_test_cases(cfg))
    .test_case(retrieve_software_client_test_case(cfg))
    .test_case(delete_software_client_test_case(cfg))
    .build()
}

fn retrieve_with_invalid_credentials(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-007",
        "I should not be able to retrieve a software client with invalid credentials",
        SPEC_LINK_RETRIEVE_SOFTWARE,
    )
    .test_case(
        cfg.test_case("Register software client")
            .generate_signed_claims(cfg.authoriser_builder.clone())
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_created()
            .parse_client_register_response(cfg.authoriser_builder.clone())
            .build(),
    )
    .test_case(
        cfg.test_case("Retrieve software client with invalid credentials grant")
            .client_retrieve_invalid_registration_access_token(cfg.registration_endpoint())
            .assert_status_code_unauthorized()
            .build(),
    )
    .test_case(
        cfg.test_case("Retrieve client credentials grant")
            .get_client_credentials_grant(cfg.token_endpoint())
            .build(),
    )
    .test_case(delete_software_client_test_case(cfg))
    .build()
}

fn update_software_client(cfg: &Dcr32Config) -> Scenario {
    let id = "DCR-008";
    let name = "I should be able update a registered software";
    if !cfg.put_implemented {
        return ScenarioBuilder::new(id, skipped("PUT", name), SPEC_LINK_UPDATE_SOFTWARE).build();
    }

    ScenarioBuilder::new(id, name, SPEC_LINK_UPDATE_SOFTWARE)
        .test_cases(create_software_client_test_cases(cfg))
        .test_case(
            cfg.test_case("Update an existing software client")
                .generate_signed_claims_for_registration_update(cfg.authoriser_builder.clone())
                .client_update(cfg.registration_endpoint())
                .assert_status_code_ok()
                .parse_client_register_response(cfg.authoriser_builder.clone())
                .build(),
        )
        .test_case(delete_software_client_test_case(cfg))
        .build()
}

fn update_software_client_with_wrong_id(cfg: &Dcr32Config) -> Scenario {
    let id = "DCR-009";
    let name = "When I try to update a non existing software client I should be unauthorized";
    if !cfg.put_implemented {
        return ScenarioBuilder::new(id, skipped("PUT", name), SPEC_LINK_UPDATE_SOFTWARE).build();
    }

    ScenarioBuilder::new(id, name, SPEC_LINK_UPDATE_SOFTWARE)
        .test_cases(create_software_client_test_cases(cfg))
        .test_case(delete_software_client_test_case(cfg))
        .test_case(
            cfg.test_case("Update a deleted software client")
                .generate_signed_claims_for_registration_update(cfg.authoriser_builder.clone())
                .client_update(cfg.registration_endpoint())
                .assert_status_code_unauthorized()
                .build(),
        )
        .build()
}

fn retrieve_software_client_wrong_id(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-010",
        "When I try to retrieve a non existing software client I should be unauthorized",
        SPEC_LINK_RETRIEVE_SOFTWARE,
    )
    .test_cases(create_software_client_test_cases(cfg))
    .test_case(delete_software_client_test_case(cfg))
    .test_case(
        cfg.test_case("Retrieve a deleted software client")
            .client_retrieve(cfg.registration_endpoint())
            .assert_status_code_unauthorized()
            .build(),
    )
    .build()
}

fn register_software_wrong_response_type(cfg: &Dcr32Config) -> Scenario {
    ScenarioBuilder::new(
        "DCR-011",
        "When I try to register a software with invalid response_types it should be fail",
        SPEC_LINK_REGISTER_SOFTWARE,
    )
    .test_case(
        cfg.test_case("Register software client")
            .generate_signed_claims(
                cfg.authoriser_builder
                    .with_response_types(vec!["id_token".to_string(), "token".to_string()]),
            )
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_bad_request()
            .build(),
    )
    .build()
}

fn registration_request_invalid_signature(cfg: &Dcr32Config, random_key: Arc<EncodingKey>) -> Scenario {
    // TODO: add the unsigned (alg=none) registration request case once a
    // conformant server's expected rejection is agreed.
    ScenarioBuilder::new(
        "DCR-012",
        "When I try to register with a request which has an invalid signature it should fail",
        SPEC_LINK_REGISTER_SOFTWARE,
    )
    .test_case(
        cfg.test_case("Register software client signed with wrong key")
            .generate_signed_claims(cfg.authoriser_builder.with_private_key(random_key))
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_bad_request()
            .assert_error_message(
                "invalid_client_metadata",
                "Registration Request JWT is invalid: Expected JWT to have a valid signature",
            )
            .build(),
    )
    .build()
}

fn register_invalid_software_statement_signing(
    cfg: &Dcr32Config,
    random_key: &EncodingKey,
) -> Result<Scenario, SigningError> {
    let ssa_signed_with_wrong_key = resign_jwt(&cfg.ssa, random_key)?;
    let ssa_with_no_signature = unsigned_jwt(&cfg.ssa)?;

    Ok(ScenarioBuilder::new(
        "DCR-013",
        "When I try to register with a software_statement claim with an invalid signature then registration MUST fail",
        SPEC_LINK_REGISTER_SOFTWARE,
    )
    .test_case(
        cfg.test_case("Register software client, software_statement signed with wrong key")
            .generate_signed_claims(cfg.authoriser_builder.with_ssa(ssa_signed_with_wrong_key))
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_bad_request()
            .assert_error_message(
                "invalid_software_statement",
                "Registration Request contains an invalid software_statement, Expected JWT to have a valid signature",
            )
            .build(),
    )
    .test_case(
        cfg.test_case("Register software client, software_statement none signing alg")
            .generate_signed_claims(cfg.authoriser_builder.with_ssa(ssa_with_no_signature))
            .post_client_register(cfg.registration_endpoint())
            .assert_status_code_bad_request()
            .assert_error_message(
                "invalid_software_statement",
                "Registration Request contains an invalid software_statement, software_statement claim is not an encoded JWT",
            )
            .build(),
    )
    .build())
}

/// Split a compact JWT into its decoded header and raw payload segment.
fn split_jwt(token: &str) -> Result<(Map<String, Value>, &str), SigningError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(SigningError::InvalidToken("expected a compact JWT".to_string()));
    };

    let header = BASE64_URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|err| SigningError::InvalidToken(err.to_string()))?;
    let header: Map<String, Value> =
        serde_json::from_slice(&header).map_err(|err| SigningError::InvalidToken(err.to_string()))?;

    Ok((header, payload))
}

/// Re-sign a JWT's payload with `key`, keeping its kid and RSA algorithm.
fn resign_jwt(token: &str, key: &EncodingKey) -> Result<String, SigningError> {
    let (header, payload) = split_jwt(token)?;
    let payload = BASE64_URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| SigningError::InvalidToken(err.to_string()))?;
    let claims: Value =
        serde_json::from_slice(&payload).map_err(|err| SigningError::InvalidToken(err.to_string()))?;

    let algorithm = header
        .get("alg")
        .and_then(Value::as_str)
        .and_then(|alg| Algorithm::from_str(alg).ok())
        .filter(|alg| {
            matches!(
                alg,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            )
        })
        .unwrap_or(Algorithm::PS256);

    let mut resigned = Header::new(algorithm);
    resigned.kid = header.get("kid").and_then(Value::as_str).map(str::to_string);

    encode(&resigned, &claims, key).map_err(|err| SigningError::EncodingFailed(err.to_string()))
}

/// The JWT with `alg` set to `none`, no `kid` and no signature segment.
fn unsigned_jwt(token: &str) -> Result<String, SigningError> {
    let (mut header, payload) = split_jwt(token)?;
    header.insert("alg".to_string(), Value::String("none".to_string()));
    header.remove("kid");

    let header =
        serde_json::to_vec(&header).map_err(|err| SigningError::EncodingFailed(err.to_string()))?;
    Ok(format!("{}.{}", BASE64_URL_SAFE_NO_PAD.encode(header), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signer::{decode_payload, test_keys};
    use crate::compliant::schema::JsonSchemaValidator;
    use jsonwebtoken::{Validation, decode, decode_header};
    use std::sync::OnceLock;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ssa() -> String {
        let mut header = Header::new(Algorithm::PS256);
        header.kid = Some("ssa-kid".to_string());
        encode(
            &header,
            &serde_json::json!({ "software_id": "tpp", "iss": "OpenBanking Ltd" }),
            &test_keys::key_pair().encoding,
        )
        .unwrap()
    }

    fn config(get: bool, put: bool, delete: bool) -> Dcr32Config {
        let openid_config = Configuration {
            issuer: "https://as.example.com".to_string(),
            registration_endpoint: Some("https://as.example.com/register".to_string()),
            token_endpoint: "https://as.example.com/token".to_string(),
            token_endpoint_auth_methods_supported: vec!["private_key_jwt".to_string()],
            ..Default::default()
        };
        Dcr32Config {
            authoriser_builder: AuthoriserBuilder::new()
                .with_openid_config(openid_config.clone())
                .with_ssa(ssa())
                .with_kid("kid")
                .with_issuer("issuer")
                .with_token_endpoint_signing_method(Algorithm::PS256)
                .with_private_key(test_keys::key_pair().encoding.clone()),
            openid_config,
            secure_client: reqwest::Client::new(),
            schema_validator: Arc::new(JsonSchemaValidator::dcr32().unwrap()),
            ssa: ssa(),
            get_implemented: get,
            put_implemented: put,
            delete_implemented: delete,
        }
    }

    /// RSA key other than the registered one, generated once.
    fn random_key() -> Arc<EncodingKey> {
        static KEY: OnceLock<Arc<EncodingKey>> = OnceLock::new();
        KEY.get_or_init(|| Arc::new(generate_rsa_signing_key().unwrap()))
            .clone()
    }

    async fn registration_server(error: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": error,
                "error_description": "rejected"
            })))
            .mount(&server)
            .await;
        server
    }

    async fn run_invalid_registration(error: &str) -> crate::compliant::scenario::ScenarioResult {
        let server = registration_server(error).await;
        let mut cfg = config(true, true, true);
        cfg.openid_config.registration_endpoint = Some(format!("{}/register", server.uri()));
        create_invalid_registration_request(&cfg).run().await
    }

    #[test]
    fn test_manifest_lists_scenarios_in_order() {
        let manifest = new_dcr32(&config(true, true, true)).unwrap();
        let ids: Vec<&str> = manifest.scenarios().iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec![
                "DCR-001", "DCR-002", "DCR-003", "DCR-004", "DCR-005", "DCR-007", "DCR-008",
                "DCR-009", "DCR-010", "DCR-011", "DCR-012", "DCR-013"
            ]
        );
        assert_eq!(manifest.name(), "DCR32");
        assert_eq!(manifest.version(), "1.0");
    }

    #[test]
    fn test_unimplemented_endpoints_are_skipped() {
        let manifest = new_dcr32_with_key(&config(false, false, false), random_key()).unwrap();
        let scenario = |id: &str| {
            manifest
                .scenarios()
                .iter()
                .find(|scenario| scenario.id() == id)
                .unwrap()
        };

        for id in ["DCR-003", "DCR-008", "DCR-009"] {
            assert!(scenario(id).name().starts_with("(SKIP "));
            assert!(scenario(id).test_cases().is_empty());
        }

        let delete = scenario("DCR-002").test_cases().last().unwrap();
        assert_eq!(delete.name(), "(SKIP Delete endpoint not implemented) Delete software client");

        let retrieve = &scenario("DCR-005").test_cases()[2];
        assert_eq!(retrieve.name(), "(SKIP Get endpoint not implemented) Retrieve software client");
    }

    #[test]
    fn test_create_software_client_only() {
        let manifest = new_create_software_client_only(&config(true, true, true)).unwrap();
        assert_eq!(manifest.scenarios().len(), 1);
        assert_eq!(manifest.scenarios()[0].id(), "DCR-002");
    }

    #[test]
    fn test_invalid_happy_path_aborts_construction() {
        let mut cfg = config(true, true, true);
        cfg.authoriser_builder = cfg.authoriser_builder.with_kid("");
        assert!(matches!(
            new_dcr32_with_key(&cfg, random_key()),
            Err(ManifestError::InvalidAuthoriser(crate::errors::AuthError::MissingKeyId))
        ));
    }

    #[test]
    fn test_non_jwt_ssa_fails_scenario_factory() {
        let mut cfg = config(true, true, true);
        cfg.ssa = "not-a-jwt".to_string();
        assert!(matches!(
            new_dcr32_with_key(&cfg, random_key()),
            Err(ManifestError::ScenarioFactoryFailed(id, _)) if id == "DCR-013"
        ));
    }

    #[test]
    fn test_resigned_ssa_keeps_claims_but_not_signature() {
        let original = ssa();
        let other_key = generate_rsa_signing_key().unwrap();
        let resigned = resign_jwt(&original, &other_key).unwrap();

        let header = decode_header(&resigned).unwrap();
        assert_eq!(header.alg, Algorithm::PS256);
        assert_eq!(header.kid.as_deref(), Some("ssa-kid"));
        assert_eq!(decode_payload(&resigned), decode_payload(&original));

        let mut validation = Validation::new(Algorithm::PS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        assert!(decode::<Value>(&original, &test_keys::key_pair().decoding, &validation).is_ok());
        assert!(decode::<Value>(&resigned, &test_keys::key_pair().decoding, &validation).is_err());
    }

    #[test]
    fn test_unsigned_ssa_has_alg_none_and_no_signature() {
        let original = ssa();
        let unsigned = unsigned_jwt(&original).unwrap();

        let segments: Vec<&str> = unsigned.split('.').collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], original.split('.').nth(1).unwrap());

        let header: Value =
            serde_json::from_slice(&BASE64_URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "none");
        assert!(header.get("kid").is_none());
    }

    #[tokio::test]
    async fn test_expired_claims_expect_invalid_client_metadata() {
        let result = run_invalid_registration("invalid_client_metadata").await;
        let expired = &result.test_cases[0];
        assert_eq!(expired.name, "Register software client fails on expired claims");
        assert!(expired.pass, "{:#?}", expired);
        assert_eq!(expired.results.last().unwrap().name, "Assert error message");

        let result = run_invalid_registration("invalid_software_statement").await;
        let expired = &result.test_cases[0];
        assert!(!expired.pass);
        let failed = expired.results.last().unwrap();
        assert_eq!(failed.name, "Assert error message");
        assert_eq!(
            failed.fail_reason.as_deref(),
            Some("Expecting error 'invalid_client_metadata', got 'invalid_software_statement'")
        );
    }
}
