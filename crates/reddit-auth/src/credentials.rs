//! Client application credentials
//!
//! Supplied once when a session is created and never mutated afterwards.
//! Whether a client secret is present decides which app-only grant is used:
//! `client_credentials` for confidential ("script"/"web") apps, the
//! installed-client grant for apps that cannot keep a secret.

use common::Secret;

/// Reddit application credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<Secret<String>>,
    pub redirect_uri: String,
    /// Reddit rejects requests with generic user agents, so this is mandatory.
    pub user_agent: String,
}

impl Credentials {
    /// Credentials for an installed (secret-less) application.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Attach a client secret. An empty secret is treated as absent.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.client_secret = (!secret.is_empty()).then(|| Secret::new(secret));
        self
    }

    pub fn has_secret(&self) -> bool {
        self.client_secret.is_some()
    }

    pub(crate) fn secret_str(&self) -> Option<&str> {
        self.client_secret.as_ref().map(|s| s.expose().as_str())
    }
}
