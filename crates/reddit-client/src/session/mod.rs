//! Authenticated session against the Reddit resource API
//!
//! A [`Session`] owns the token state for one client application, the
//! rate-limit observations, and the token-change listeners. It is meant to be
//! shared (`Arc<Session>`) by concurrent calls; all state is interior.
//!
//! Token acquisition is not single-flight: two calls that both find no access
//! token both hit the token endpoint, and the last one to finish wins.

mod api;
mod executor;


pub use executor::ApiRequest;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info};

use common::Secret;
use reddit_auth::{API_ENDPOINT, Credentials, TOKEN_ENDPOINT, TokenProvider};

use crate::error::{Error, Result};
use crate::listeners::{ListenerId, TokenListeners};
use crate::metrics::record_token_fetch;
use crate::ratelimit::RateLimiter;

/// Backend retries per logical call when none is configured.
pub const DEFAULT_MAX_RETRY: u32 = 1;

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<Secret<String>>,
}

/// Shared client state for one application and (optionally) one user.
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    provider: TokenProvider,
    api_url: String,
    max_retry: u32,
    tokens: RwLock<TokenState>,
    rate_limiter: RwLock<RateLimiter>,
    in_progress: AtomicUsize,
    listeners: TokenListeners,
}

/// Builder for [`Session`]; obtain one with [`Session::builder`].
#[derive(Debug)]
pub struct SessionBuilder {
    credentials: Credentials,
    max_retry: u32,
    access_token: Option<String>,
    refresh_token: Option<String>,
    api_url: String,
    token_url: String,
    http: Option<reqwest::Client>,
}

impl SessionBuilder {
    /// Backend retries per call. 0 falls back to [`DEFAULT_MAX_RETRY`].
    #[must_use]
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = if max_retry == 0 {
            DEFAULT_MAX_RETRY
        } else {
            max_retry
        };
        self
    }

    /// Start with a known access token; no token fetch until it is rejected.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Renew through the refresh grant instead of the app-only grant.
    #[must_use]
    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Use a preconfigured HTTP client (proxies, custom TLS roots).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<Session> {
        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(self.credentials.user_agent.clone())
                .build()
                .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?,
        };
        let provider = TokenProvider::new(http.clone(), self.credentials).with_token_url(self.token_url);

        Ok(Session {
            http,
            provider,
            api_url: self.api_url.trim_end_matches('/').to_owned(),
            max_retry: self.max_retry,
            tokens: RwLock::new(TokenState {
                access_token: self.access_token.filter(|t| !t.is_empty()),
                refresh_token: self
                    .refresh_token
                    .filter(|t| !t.is_empty())
                    .map(Secret::new),
            }),
            rate_limiter: RwLock::new(RateLimiter::new()),
            in_progress: AtomicUsize::new(0),
            listeners: TokenListeners::default(),
        })
    }
}

impl Session {
    pub fn builder(credentials: Credentials) -> SessionBuilder {
        SessionBuilder {
            credentials,
            max_retry: DEFAULT_MAX_RETRY,
            access_token: None,
            refresh_token: None,
            api_url: API_ENDPOINT.to_owned(),
            token_url: TOKEN_ENDPOINT.to_owned(),
            http: None,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        self.provider.credentials()
    }

    /// Token endpoint client sharing this session's HTTP client.
    pub fn token_provider(&self) -> &TokenProvider {
        &self.provider
    }

    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// Transport attempts currently awaiting a response.
    pub fn in_progress(&self) -> usize {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Snapshot of the rate-limit state from the last response.
    pub async fn rate_limit(&self) -> RateLimiter {
        self.rate_limiter.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    pub async fn has_refresh_token(&self) -> bool {
        self.tokens.read().await.refresh_token.is_some()
    }

    /// Replace the held tokens. `None` (or empty) clears a token.
    ///
    /// Listeners are not notified; they only see tokens this session obtains.
    pub async fn set_tokens(&self, access_token: Option<String>, refresh_token: Option<String>) {
        let mut tokens = self.tokens.write().await;
        tokens.access_token = access_token.filter(|t| !t.is_empty());
        tokens.refresh_token = refresh_token.filter(|t| !t.is_empty()).map(Secret::new);
        debug!(
            has_access_token = tokens.access_token.is_some(),
            has_refresh_token = tokens.refresh_token.is_some(),
            "tokens replaced"
        );
    }

    /// Register a callback for every access token this session obtains.
    pub fn on_token<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Unregister a callback. Returns `false` if it was already removed.
    pub fn off_token(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Obtain a new access token, store it, and notify listeners.
    ///
    /// Uses the refresh grant when a refresh token is held, the app-only grant
    /// otherwise. A refresh token in the response replaces the held one.
    pub async fn fetch_access_token(&self) -> Result<String> {
        let refresh_token = self.tokens.read().await.refresh_token.clone();

        let (token, grant) = match &refresh_token {
            Some(refresh_token) => (
                self.provider.refresh(refresh_token.expose()).await?,
                "refresh_token",
            ),
            None => {
                let redirect_uri = &self.provider.credentials().redirect_uri;
                (self.provider.obtain_app_only(redirect_uri).await?, "app_only")
            }
        };

        {
            let mut tokens = self.tokens.write().await;
            tokens.access_token = Some(token.access_token.clone());
            if let Some(rotated) = token.refresh_token.filter(|t| !t.is_empty()) {
                tokens.refresh_token = Some(Secret::new(rotated));
            }
        }

        record_token_fetch(grant);
        info!(grant, expires_in = token.expires_in, "access token obtained");
        self.listeners.notify(&token.access_token);
        Ok(token.access_token)
    }
}
