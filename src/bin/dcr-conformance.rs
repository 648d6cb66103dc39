//! Dynamic Client Registration conformance runner.
//!
//! Loads a configuration file, discovers the authorization server, assembles
//! the DCR 3.2 manifest and runs it. Exits non-zero unless every selected
//! scenario passes.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context as _, Result};
use clap::Parser;
use dcr_conformance::{
    auth::{AuthoriserBuilder, signer::signing_key_from_pem},
    compliant::{
        JsonReporter, JsonSchemaValidator, TextReporter, Tester,
        dcr32::{Dcr32Config, new_create_software_client_only, new_dcr32},
    },
    config::{self, Config},
    http::SecureClientBuilder,
    oauth::openid,
};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "dcr-conformance",
    about = "OAuth 2.0 Dynamic Client Registration 3.2 conformance suite",
    disable_version_flag = true
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, required_unless_present = "version")]
    config_path: Option<PathBuf>,

    /// Only run scenarios whose id or name contains this value
    #[arg(long, default_value = "")]
    filter: String,

    /// Print diagnostic step output and enable debug logging
    #[arg(long)]
    debug: bool,

    /// Disable ANSI colours in the report
    #[arg(long)]
    no_colour: bool,

    /// Also write the result as JSON to this path
    #[arg(long)]
    report_path: Option<PathBuf>,

    /// Print the version and exit
    #[arg(long)]
    version: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", config::version()?);
        return Ok(ExitCode::SUCCESS);
    }

    let default_filter = if cli.debug {
        "dcr_conformance=debug"
    } else {
        "dcr_conformance=info,warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await.inspect_err(|err| {
        tracing::error!(error = ?err, "conformance run aborted");
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli
        .config_path
        .context("--config-path is required")?;
    let config = Config::load(&config_path)?;
    tracing::info!(
        version = %config.version,
        spec_version = config.spec_version.as_ref(),
        environment = %config.environment,
        brand = %config.brand,
        "starting conformance run"
    );

    let private_key = Arc::new(signing_key_from_pem(config.private_key.as_bytes())?);
    let timeout = *config.http_client_timeout.as_ref();

    let discovery_client = SecureClientBuilder::new()
        .with_timeout(timeout)
        .with_user_agent(&config.user_agent)
        .build()?;
    let openid_config = openid::fetch(&config.wellknown_endpoint, &discovery_client)
        .await
        .with_context(|| format!("discovering {}", config.wellknown_endpoint))?;

    let secure_client = SecureClientBuilder::new()
        .with_root_cas(config.transport_root_cas.clone())
        .with_transport_key_pair(&config.transport_cert, &config.transport_key)
        .with_timeout(timeout)
        .with_user_agent(&config.user_agent)
        .build()?;

    let mut authoriser_builder = AuthoriserBuilder::new()
        .with_openid_config(openid_config.clone())
        .with_ssa(&config.ssa)
        .with_kid(&config.kid)
        .with_issuer(&config.issuer)
        .with_redirect_uris(config.redirect_uris.clone())
        .with_response_types(config.response_types.as_ref().clone())
        .with_token_endpoint_signing_method(*config.token_endpoint_signing_alg.as_ref())
        .with_private_key(private_key);
    if let Some(aud) = &config.aud {
        authoriser_builder = authoriser_builder.with_aud(aud);
    }
    if let Some(dn) = &config.transport_cert_subject_dn {
        authoriser_builder = authoriser_builder.with_transport_cert_subject_dn(dn);
    }
    if let Some(method) = config.preferred_token_endpoint_auth_method {
        authoriser_builder = authoriser_builder.with_preferred_token_endpoint_auth_method(method);
    }
    if let Some(alg) = &config.authorization_signed_response_alg {
        authoriser_builder = authoriser_builder.with_authorization_signed_response_alg(alg);
    }

    let dcr32_config = Dcr32Config {
        openid_config,
        secure_client,
        authoriser_builder,
        schema_validator: Arc::new(JsonSchemaValidator::dcr32()?),
        ssa: config.ssa.clone(),
        get_implemented: config.get_implemented,
        put_implemented: config.put_implemented,
        delete_implemented: config.delete_implemented,
    };

    let manifest = if config.create_software_client_only {
        new_create_software_client_only(&dcr32_config)?
    } else {
        new_dcr32(&dcr32_config)?
    };

    let mut tester = Tester::new(cli.filter).with_reporter(
        TextReporter::new(std::io::stdout())
            .verbose(cli.debug)
            .colour(!cli.no_colour),
    );
    if let Some(path) = cli.report_path {
        tester = tester.with_reporter(JsonReporter::new(path));
    }

    if tester.compliant(&manifest).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
