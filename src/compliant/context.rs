//! Shared state of one scenario run.

use std::collections::HashMap;

use crate::errors::ContextError;
use crate::http::HttpResponse;
use crate::oauth::clients::Client;
use crate::oauth::openid::Configuration;
use crate::oauth::types::GrantToken;

/// Kind-partitioned key/value store threaded through every step of a scenario.
///
/// Each kind has its own namespace, so the same key can hold a client and a
/// response at once. Values are only ever written or overwritten.
#[derive(Debug, Default)]
pub struct Context {
    http_clients: HashMap<String, reqwest::Client>,
    clients: HashMap<String, Client>,
    grant_tokens: HashMap<String, GrantToken>,
    responses: HashMap<String, HttpResponse>,
    openid_configs: HashMap<String, Configuration>,
    strings: HashMap<String, String>,
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, key: &str) -> Result<&'a T, ContextError> {
    map.get(key).ok_or_else(|| ContextError::NotFound(key.to_string()))
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_http_client(&mut self, key: impl Into<String>, value: reqwest::Client) {
        self.http_clients.insert(key.into(), value);
    }

    pub fn get_http_client(&self, key: &str) -> Result<&reqwest::Client, ContextError> {
        lookup(&self.http_clients, key)
    }

    pub fn set_client(&mut self, key: impl Into<String>, value: Client) {
        self.clients.insert(key.into(), value);
    }

    pub fn get_client(&self, key: &str) -> Result<&Client, ContextError> {
        lookup(&self.clients, key)
    }

    pub fn set_grant_token(&mut self, key: impl Into<String>, value: GrantToken) {
        self.grant_tokens.insert(key.into(), value);
    }

    pub fn get_grant_token(&self, key: &str) -> Result<&GrantToken, ContextError> {
        lookup(&self.grant_tokens, key)
    }

    pub fn set_response(&mut self, key: impl Into<String>, value: HttpResponse) {
        self.responses.insert(key.into(), value);
    }

    pub fn get_response(&self, key: &str) -> Result<&HttpResponse, ContextError> {
        lookup(&self.responses, key)
    }

    pub fn set_openid_config(&mut self, key: impl Into<String>, value: Configuration) {
        self.openid_configs.insert(key.into(), value);
    }

    pub fn get_openid_config(&self, key: &str) -> Result<&Configuration, ContextError> {
        lookup(&self.openid_configs, key)
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    pub fn get_string(&self, key: &str) -> Result<&str, ContextError> {
        lookup(&self.strings, key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::clients::ClientCredentials;

    #[test]
    fn test_missing_key_names_the_key() {
        let ctx = Context::new();
        let err = ctx.get_client("clientKey").unwrap_err();
        assert!(matches!(&err, ContextError::NotFound(key) if key == "clientKey"));
        assert!(err.to_string().contains("key not found in context: clientKey"));
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mut ctx = Context::new();
        ctx.set_string("shared", "claims");
        ctx.set_client(
            "shared",
            Client::new("12345", "abcdef", None, ClientCredentials::TlsClientAuth),
        );

        assert_eq!(ctx.get_string("shared").unwrap(), "claims");
        assert_eq!(ctx.get_client("shared").unwrap().id(), "12345");
        assert!(ctx.get_grant_token("shared").is_err());
    }

    #[test]
    fn test_set_overwrites() {
        let mut ctx = Context::new();
        ctx.set_string("claims", "first");
        ctx.set_string("claims", "second");
        assert_eq!(ctx.get_string("claims").unwrap(), "second");
    }
}
