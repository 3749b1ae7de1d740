//! Reddit OAuth token library
//!
//! Token endpoint access for the Reddit client: grant selection, Basic
//! client authentication, response validation, and the consent URL. This
//! crate holds no session state; `reddit-client` decides when to call it.
//!
//! Token flow:
//! 1. Caller builds a consent URL with `AuthorizationRequest::url()`
//! 2. User approves; the redirect carries `code`
//! 3. `TokenProvider::obtain_from_code()` exchanges it for a `Token`
//! 4. `TokenProvider::refresh()` renews from the refresh token, or
//!    `TokenProvider::obtain_app_only()` gets a userless token

pub mod authorize;
pub mod basic_auth;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod grant;
pub mod provider;
pub mod token;

pub use authorize::{AuthorizationDuration, AuthorizationRequest, Scope, generate_state};
pub use basic_auth::basic_auth_header;
pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use grant::Grant;
pub use provider::TokenProvider;
pub use token::{MANDATORY_FIELDS, Token, TokenResponse, parse_token_body};
