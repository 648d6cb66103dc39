//! Secured HTTP client construction.

use std::time::Duration;

use crate::errors::HttpClientError;

/// Builds the `reqwest::Client` used to talk to the authorization server.
///
/// Root CAs are trusted in addition to the platform roots. The transport
/// certificate and key become the mutual TLS identity when both are set.
#[derive(Clone, Debug, Default)]
pub struct SecureClientBuilder {
    root_cas: Vec<String>,
    transport_cert: String,
    transport_key: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl SecureClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_cas(mut self, root_cas: Vec<String>) -> Self {
        self.root_cas = root_cas;
        self
    }

    pub fn with_transport_key_pair(mut self, cert: impl Into<String>, key: impl Into<String>) -> Self {
        self.transport_cert = cert.into();
        self.transport_key = key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<reqwest::Client, HttpClientError> {
        let mut client_builder = reqwest::Client::builder().use_rustls_tls();

        for root_ca in self.root_cas.iter().filter(|pem| !pem.trim().is_empty()) {
            let certs = reqwest::Certificate::from_pem_bundle(root_ca.as_bytes())
                .map_err(|err| HttpClientError::InvalidRootCa(err.to_string()))?;
            if certs.is_empty() {
                return Err(HttpClientError::InvalidRootCa(
                    "no certificate found in PEM".to_string(),
                ));
            }
            for cert in certs {
                client_builder = client_builder.add_root_certificate(cert);
            }
        }

        match (self.transport_cert.trim(), self.transport_key.trim()) {
            ("", "") => {
                tracing::debug!("no transport key pair configured, mutual TLS disabled");
            }
            ("", _) | (_, "") => {
                return Err(HttpClientError::InvalidTransportKeyPair(
                    "both transport_cert and transport_key are required".to_string(),
                ));
            }
            (cert, key) => {
                let pem = format!("{}\n{}\n", cert, key);
                let identity = reqwest::Identity::from_pem(pem.as_bytes())
                    .map_err(|err| HttpClientError::InvalidTransportKeyPair(err.to_string()))?;
                client_builder = client_builder.identity(identity);
            }
        }

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }

        client_builder
            .build()
            .map_err(|err| HttpClientError::BuildFailed(err.to_string()))
    }
}
