//! OAuth grant selection
//!
//! Each token request is described by one [`Grant`] variant. The app-only
//! variant is resolved to a concrete `grant_type` only when the form is built,
//! because the choice depends on whether the client holds a secret.

use common::Secret;

use crate::constants::{DEVICE_ID, INSTALLED_CLIENT_GRANT};

/// A token endpoint exchange.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Exchange a code received on the redirect URI after user consent.
    AuthorizationCode {
        code: Secret<String>,
        redirect_uri: String,
    },
    /// Renew an access token from a permanent refresh token.
    Refresh { refresh_token: Secret<String> },
    /// Userless token: `client_credentials` with a secret, installed client
    /// otherwise.
    AppOnly { redirect_uri: String },
}

impl Grant {
    /// `grant_type` form value sent to the token endpoint.
    pub fn grant_type(&self, has_secret: bool) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::Refresh { .. } => "refresh_token",
            Grant::AppOnly { .. } if has_secret => "client_credentials",
            Grant::AppOnly { .. } => INSTALLED_CLIENT_GRANT,
        }
    }

    /// Short label for logs and metrics (never contains secrets).
    pub fn label(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::Refresh { .. } => "refresh_token",
            Grant::AppOnly { .. } => "app_only",
        }
    }

    /// Form body pairs, in wire order. Empty values are dropped.
    pub fn form(&self, has_secret: bool) -> Vec<(&'static str, String)> {
        let grant_type = self.grant_type(has_secret).to_owned();
        let pairs = match self {
            Grant::AuthorizationCode { code, redirect_uri } => vec![
                ("grant_type", grant_type),
                ("code", code.expose().clone()),
                ("redirect_uri", redirect_uri.clone()),
            ],
            Grant::Refresh { refresh_token } => vec![
                ("grant_type", grant_type),
                ("refresh_token", refresh_token.expose().clone()),
            ],
            Grant::AppOnly { redirect_uri } if has_secret => vec![
                ("grant_type", grant_type),
                ("redirect_uri", redirect_uri.clone()),
            ],
            Grant::AppOnly { redirect_uri } => vec![
                ("grant_type", grant_type),
                ("device_id", DEVICE_ID.to_owned()),
                ("redirect_uri", redirect_uri.clone()),
            ],
        };
        pairs.into_iter().filter(|(_, v)| !v.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&'static str, String)]) -> Vec<&'static str> {
        pairs.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn authorization_code_form() {
        let grant = Grant::AuthorizationCode {
            code: Secret::from("asdfasdfjhsdkfhsdf"),
            redirect_uri: "http://toto.website/callback".into(),
        };
        let form = grant.form(true);
        assert_eq!(keys(&form), ["grant_type", "code", "redirect_uri"]);
        assert_eq!(form[0].1, "authorization_code");
        assert_eq!(form[1].1, "asdfasdfjhsdkfhsdf");
    }

    #[test]
    fn app_only_with_secret_uses_client_credentials() {
        let grant = Grant::AppOnly {
            redirect_uri: "myapp://callback".into(),
        };
        let form = grant.form(true);
        assert_eq!(keys(&form), ["grant_type", "redirect_uri"]);
        assert_eq!(form[0].1, "client_credentials");
    }

    #[test]
    fn app_only_without_secret_uses_installed_client() {
        let grant = Grant::AppOnly {
            redirect_uri: "myapp://callback".into(),
        };
        let form = grant.form(false);
        assert_eq!(keys(&form), ["grant_type", "device_id", "redirect_uri"]);
        assert_eq!(form[0].1, INSTALLED_CLIENT_GRANT);
        assert_eq!(form[1].1, "DO_NOT_TRACK_THIS_DEVICE");
    }

    #[test]
    fn refresh_form_ignores_secret_presence() {
        let grant = Grant::Refresh {
            refresh_token: Secret::from("orangejuicetoken"),
        };
        assert_eq!(grant.form(true), grant.form(false));
        assert_eq!(keys(&grant.form(false)), ["grant_type", "refresh_token"]);
    }

    #[test]
    fn empty_values_are_dropped() {
        let grant = Grant::AppOnly {
            redirect_uri: String::new(),
        };
        assert_eq!(keys(&grant.form(true)), ["grant_type"]);
    }

    #[test]
    fn debug_does_not_leak_refresh_token() {
        let grant = Grant::Refresh {
            refresh_token: Secret::from("rt_secret_value"),
        };
        assert!(!format!("{grant:?}").contains("rt_secret_value"));
        assert_eq!(grant.label(), "refresh_token");
    }
}
