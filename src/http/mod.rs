//! HTTP plumbing shared by the discovery fetcher and the conformance steps.

pub mod client;
pub mod response;

pub use client::SecureClientBuilder;
pub use response::HttpResponse;
