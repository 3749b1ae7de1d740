//! Token endpoint client
//!
//! Performs the three grant flows against [`TOKEN_ENDPOINT`] and maps every
//! failure signal the endpoint uses onto a distinct [`Error`] variant:
//!
//! | Signal | Error |
//! |---|---|
//! | HTTP 401 | `BadClientCredentials` |
//! | HTTP >= 500 | `Backend` |
//! | `refresh_token: "NO_TEXT"` (refresh only) | `MissingRefreshToken` |
//! | `error: "invalid_grant"` | `BadAuthorizationCode` |
//! | any other `error` | `Upstream` |
//! | missing mandatory fields | `IncompleteResponse` |

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, info};

use common::Secret;

use crate::basic_auth::basic_auth_header;
use crate::constants::{NO_REFRESH_TOKEN_SENTINEL, TOKEN_ENDPOINT};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::grant::Grant;
use crate::token::{Token, parse_token_body};

/// Obtains access tokens for one client application.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: String,
    credentials: Credentials,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: TOKEN_ENDPOINT.to_owned(),
            credentials,
        }
    }

    /// Override the token endpoint (mock servers, proxies).
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Exchange an authorization code for tokens.
    pub async fn obtain_from_code(&self, code: &str, redirect_uri: &str) -> Result<Token> {
        self.request(&Grant::AuthorizationCode {
            code: Secret::from(code),
            redirect_uri: redirect_uri.to_owned(),
        })
        .await
    }

    /// Obtain a userless token for this application.
    pub async fn obtain_app_only(&self, redirect_uri: &str) -> Result<Token> {
        self.request(&Grant::AppOnly {
            redirect_uri: redirect_uri.to_owned(),
        })
        .await
    }

    /// Obtain a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        self.request(&Grant::Refresh {
            refresh_token: Secret::from(refresh_token),
        })
        .await
    }

    /// POST one grant to the token endpoint and validate the answer.
    pub async fn request(&self, grant: &Grant) -> Result<Token> {
        let has_secret = self.credentials.has_secret();
        debug!(
            grant = grant.label(),
            grant_type = grant.grant_type(has_secret),
            "requesting token"
        );

        let response = self
            .http
            .post(&self.token_url)
            .header(
                AUTHORIZATION,
                basic_auth_header(&self.credentials.client_id, self.credentials.secret_str()),
            )
            .form(&grant.form(has_secret))
            .send()
            .await
            .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::BadClientCredentials);
        }
        if status.as_u16() >= 500 {
            return Err(Error::Backend);
        }

        let body: Value = response.json().await.map_err(|e| {
            Error::Decode(format!("token endpoint returned {status} without JSON: {e}"))
        })?;

        if matches!(grant, Grant::Refresh { .. })
            && body.get("refresh_token").and_then(Value::as_str) == Some(NO_REFRESH_TOKEN_SENTINEL)
        {
            return Err(Error::MissingRefreshToken);
        }

        let token = parse_token_body(body)?;
        info!(
            grant = grant.label(),
            expires_in = token.expires_in,
            scopes = token.scope.len(),
            refreshable = token.refresh_token.is_some(),
            "obtained access token"
        );
        Ok(token)
    }
}
