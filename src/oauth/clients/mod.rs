//! Software clients registered during a conformance run.

pub mod client;

pub use client::{Client, ClientCredentials};
