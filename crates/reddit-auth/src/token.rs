//! Token wire format and validation
//!
//! The token endpoint answers every grant with the same JSON shape:
//! snake_case fields and a single space-separated `scope` string. Errors are
//! reported in-band (`{"error": "invalid_grant"}`) as often as through the
//! status code, so the body is inspected as a JSON value before it is
//! decoded into [`TokenResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::INVALID_GRANT;
use crate::error::{Error, Result};

/// Fields every successful token response must carry, in reporting order.
pub const MANDATORY_FIELDS: [&str; 4] = ["access_token", "token_type", "expires_in", "scope"];

/// Token as sent on the wire by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    /// Space-separated scope identifiers
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Access token held by a session.
///
/// Never mutated in place; a renewal replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: Vec<String>,
    /// Only present for `permanent` authorization-code grants.
    pub refresh_token: Option<String>,
}

impl From<TokenResponse> for Token {
    fn from(wire: TokenResponse) -> Self {
        Self {
            access_token: wire.access_token,
            token_type: wire.token_type,
            expires_in: wire.expires_in,
            scope: wire.scope.split(' ').map(str::to_owned).collect(),
            refresh_token: wire.refresh_token,
        }
    }
}

impl From<&Token> for TokenResponse {
    fn from(token: &Token) -> Self {
        Self {
            access_token: token.access_token.clone(),
            token_type: token.token_type.clone(),
            expires_in: token.expires_in,
            scope: token.scope.join(" "),
            refresh_token: token.refresh_token.clone(),
        }
    }
}

/// Validate a decoded token endpoint body and convert it to a [`Token`].
///
/// Checks, in order: an in-band `error` field, then presence of every
/// [`MANDATORY_FIELDS`] key. Missing keys are all reported together.
pub fn parse_token_body(body: Value) -> Result<Token> {
    let Value::Object(fields) = &body else {
        return Err(Error::Decode(format!(
            "expected a JSON object, got: {body}"
        )));
    };

    match fields.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(e)) if e.is_empty() => {}
        Some(Value::String(e)) if e == INVALID_GRANT => return Err(Error::BadAuthorizationCode),
        Some(Value::String(e)) => return Err(Error::Upstream(e.clone())),
        Some(other) => return Err(Error::Upstream(other.to_string())),
    }

    let missing: Vec<&'static str> = MANDATORY_FIELDS
        .iter()
        .copied()
        .filter(|field| !fields.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompleteResponse(missing));
    }

    let wire: TokenResponse =
        serde_json::from_value(body).map_err(|e| Error::Decode(e.to_string()))?;
    Ok(wire.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "access_token": "at_abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "identity read",
        })
    }

    #[test]
    fn decodes_scope_into_ordered_list() {
        let token = parse_token_body(valid_body()).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.scope, vec!["identity", "read"]);
        assert_eq!(token.refresh_token, None);
    }

    #[test]
    fn keeps_refresh_token_when_present() {
        let mut body = valid_body();
        body["refresh_token"] = json!("rt_def");
        let token = parse_token_body(body).unwrap();
        assert_eq!(token.refresh_token.as_deref(), Some("rt_def"));
    }

    #[test]
    fn reports_each_missing_subset_in_fixed_order() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["scope"], &["scope"]),
            (&["access_token", "scope"], &["access_token", "scope"]),
            (&["expires_in"], &["expires_in"]),
            (&["scope", "token_type"], &["token_type", "scope"]),
            (
                &["scope", "expires_in", "token_type", "access_token"],
                &MANDATORY_FIELDS,
            ),
        ];

        for (removed, expected) in cases {
            let mut body = valid_body();
            for field in *removed {
                body.as_object_mut().unwrap().remove(*field);
            }
            match parse_token_body(body) {
                Err(Error::IncompleteResponse(missing)) => {
                    assert_eq!(missing.as_slice(), *expected, "removed {removed:?}")
                }
                other => panic!("expected IncompleteResponse for {removed:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_grant_is_bad_authorization_code() {
        let err = parse_token_body(json!({ "error": "invalid_grant" })).unwrap_err();
        assert!(matches!(err, Error::BadAuthorizationCode), "got {err:?}");
    }

    #[test]
    fn other_error_is_reported_verbatim() {
        let err = parse_token_body(json!({ "error": "something bad happened" })).unwrap_err();
        match err {
            Error::Upstream(msg) => assert_eq!(msg, "something bad happened"),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn error_check_runs_before_field_check() {
        // An error body never has the mandatory fields; the error must win.
        let err = parse_token_body(json!({ "error": "unsupported_grant_type" })).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)), "got {err:?}");
    }

    #[test]
    fn mistyped_field_is_decode_error() {
        let mut body = valid_body();
        body["expires_in"] = json!("soon");
        let err = parse_token_body(body).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }

    #[test]
    fn non_object_body_is_decode_error() {
        let err = parse_token_body(json!(["not", "a", "token"])).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let token = Token {
            access_token: "at_test".into(),
            token_type: "bearer".into(),
            expires_in: 86400,
            scope: vec!["identity".into(), "history".into(), "read".into()],
            refresh_token: Some("rt_test".into()),
        };

        let wire = TokenResponse::from(&token);
        assert_eq!(wire.scope, "identity history read");

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(parse_token_body(json).unwrap(), token);
    }

    #[test]
    fn absent_refresh_token_is_not_serialized() {
        let wire = TokenResponse {
            access_token: "at".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            scope: "*".into(),
            refresh_token: None,
        };
        let json = serde_json::to_string(&wire).unwrap();
        assert!(!json.contains("refresh_token"), "got {json}");
    }
}
