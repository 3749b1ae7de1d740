//! Error types for token endpoint operations

/// Errors from the Reddit token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad client id and/or client secret")]
    BadClientCredentials,

    #[error("the authorization code has expired or already been used")]
    BadAuthorizationCode,

    #[error("refresh token was not sent, this grant cannot be refreshed")]
    MissingRefreshToken,

    #[error("reddit backend error (5xx)")]
    Backend,

    #[error("mandatory value(s) missing in token response: {}", .0.join(","))]
    IncompleteResponse(Vec<&'static str>),

    #[error("token endpoint error: {0}")]
    Upstream(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid token response: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_response_lists_fields_in_order() {
        let err = Error::IncompleteResponse(vec!["access_token", "scope"]);
        assert_eq!(
            err.to_string(),
            "mandatory value(s) missing in token response: access_token,scope"
        );
    }

    #[test]
    fn upstream_error_carries_message() {
        let err = Error::Upstream("unsupported_grant_type".into());
        assert!(err.to_string().contains("unsupported_grant_type"));
    }
}
