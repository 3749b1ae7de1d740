//! Authorization URL for the interactive consent flow
//!
//! The user opens this URL, approves the requested scopes, and Reddit
//! redirects to `redirect_uri` with `code` and the unchanged `state`. The code
//! is then exchanged through [`TokenProvider::obtain_from_code`].
//!
//! [`TokenProvider::obtain_from_code`]: crate::TokenProvider::obtain_from_code

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::constants::{AUTHORIZE_COMPACT_ENDPOINT, AUTHORIZE_ENDPOINT};
use crate::error::{Error, Result};

/// How long the granted access lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationDuration {
    /// One hour, no refresh token.
    Temporary,
    /// Comes with a refresh token.
    #[default]
    Permanent,
}

impl AuthorizationDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationDuration::Temporary => "temporary",
            AuthorizationDuration::Permanent => "permanent",
        }
    }
}

/// OAuth scopes understood by Reddit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Account,
    Creddits,
    Edit,
    Flair,
    History,
    Identity,
    Livemanage,
    Modconfig,
    Modcontributors,
    Modflair,
    Modlog,
    Modmail,
    Modothers,
    Modposts,
    Modself,
    Modwiki,
    Modtraffic,
    Mysubreddits,
    Privatemessages,
    Read,
    Report,
    Save,
    Structuredstyles,
    Submit,
    Subscribe,
    Vote,
    Wikiedit,
    Wikiread,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Account => "account",
            Scope::Creddits => "creddits",
            Scope::Edit => "edit",
            Scope::Flair => "flair",
            Scope::History => "history",
            Scope::Identity => "identity",
            Scope::Livemanage => "livemanage",
            Scope::Modconfig => "modconfig",
            Scope::Modcontributors => "modcontributors",
            Scope::Modflair => "modflair",
            Scope::Modlog => "modlog",
            Scope::Modmail => "modmail",
            Scope::Modothers => "modothers",
            Scope::Modposts => "modposts",
            Scope::Modself => "modself",
            Scope::Modwiki => "modwiki",
            Scope::Modtraffic => "modtraffic",
            Scope::Mysubreddits => "mysubreddits",
            Scope::Privatemessages => "privatemessages",
            Scope::Read => "read",
            Scope::Report => "report",
            Scope::Save => "save",
            Scope::Structuredstyles => "structuredstyles",
            Scope::Submit => "submit",
            Scope::Subscribe => "subscribe",
            Scope::Vote => "vote",
            Scope::Wikiedit => "wikiedit",
            Scope::Wikiread => "wikiread",
        }
    }
}

/// Parameters of one consent request.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub duration: AuthorizationDuration,
    pub scopes: Vec<Scope>,
    /// Opaque CSRF value echoed back on the redirect.
    pub state: String,
    /// Use the compact (mobile) consent page.
    pub compact: bool,
}

impl AuthorizationRequest {
    /// Build the consent URL. Parameter values are percent-encoded.
    pub fn url(&self) -> Result<Url> {
        let endpoint = if self.compact {
            AUTHORIZE_COMPACT_ENDPOINT
        } else {
            AUTHORIZE_ENDPOINT
        };
        let scope = self
            .scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(",");

        Url::parse_with_params(
            endpoint,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("state", self.state.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("duration", self.duration.as_str()),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| Error::InvalidUrl(format!("{endpoint}: {e}")))
    }
}

/// Generate a random URL-safe `state` value (32 random bytes).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
