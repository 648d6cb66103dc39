//! Dynamic Client Registration conformance suite.
//!
//! Registers, retrieves, updates and deletes software clients against an
//! OAuth 2.0 authorization server and reports whether its registration
//! endpoint behaves as the Open Banking DCR specification requires.

pub mod auth;
pub mod compliant;
pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
