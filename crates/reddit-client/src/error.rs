//! Error types for session operations

/// Errors from resource API calls made through a [`Session`](crate::Session).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token acquisition failed; the token endpoint error is kept unchanged.
    #[error(transparent)]
    Auth(#[from] reddit_auth::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient permission (403): {0}")]
    Unauthorized(String),

    #[error("bad access token used as bearer (401 after renewal)")]
    BadOauthCredentials,

    #[error("reddit backend error (5xx), retries exhausted")]
    Backend,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What a caller should do about a failed call.
///
/// - Credential: fix client id/secret or the stored refresh token
/// - Reauthorize: run the consent flow again (expired code, no refresh support)
/// - Resource: the request itself is wrong (missing thing, no permission)
/// - Transient: backend trouble, already retried internally
/// - Protocol: the server answered something we could not understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Credential,
    Reauthorize,
    Resource,
    Transient,
    Protocol,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        use reddit_auth::Error as Auth;
        match self {
            Error::Auth(Auth::BadClientCredentials) | Error::BadOauthCredentials => {
                ErrorClass::Credential
            }
            Error::Auth(Auth::BadAuthorizationCode | Auth::MissingRefreshToken) => {
                ErrorClass::Reauthorize
            }
            Error::NotFound(_) | Error::Unauthorized(_) => ErrorClass::Resource,
            Error::Backend | Error::Http(_) | Error::Auth(Auth::Backend | Auth::Http(_)) => {
                ErrorClass::Transient
            }
            Error::Decode(_)
            | Error::Auth(
                Auth::IncompleteResponse(_)
                | Auth::Upstream(_)
                | Auth::Decode(_)
                | Auth::InvalidUrl(_),
            ) => ErrorClass::Protocol,
        }
    }
}
