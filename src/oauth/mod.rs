//! OAuth 2.0 and OpenID Connect client side building blocks.

pub mod clients;
pub mod openid;
pub mod types;

pub use clients::{Client, ClientCredentials};
pub use openid::Configuration;
pub use types::{ClientRegistrationResponse, GrantToken, OAuthErrorResponse, TokenEndpointAuthMethod};
