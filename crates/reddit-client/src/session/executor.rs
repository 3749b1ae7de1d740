//! Request execution: token, throttle, send, classify
//!
//! One logical call runs this loop until it succeeds or fails for good:
//!
//! 1. ENSURE_TOKEN: fetch an access token if none is held
//! 2. THROTTLE: wait out the rate-limit window if the quota is nearly spent
//! 3. SEND: one transport attempt, counted in `in_progress`
//! 4. CLASSIFY:
//!    - 404 → `NotFound`, 403 → `Unauthorized`
//!    - 401 → renew the token once, then `BadOauthCredentials`
//!    - >= 500 → back off `attempt * 1s` up to `max_retry` times, then `Backend`
//!    - anything else is returned to the caller
//!
//! Transport errors are not retried.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::Session;
use crate::error::{Error, Result};
use crate::metrics::{record_request, record_retry, record_throttle_wait};
use crate::ratelimit::MIN_REMAINING_REQUEST_THRESHOLD;

/// A resource API request, relative to the session's API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    form: Option<Vec<(String, String)>>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            form: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Send `pairs` as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.form = Some(pairs);
        self
    }

    /// Extra headers. `Authorization` and `User-Agent` are always overridden.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Backoff before retry number `attempt + 1` after a backend error.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt) * 1000)
}

/// Counts one transport attempt as in flight for as long as it lives.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Session {
    /// Run `request` and decode the JSON response body.
    pub async fn request_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(format!("{}: {e}", request.path)))
    }

    /// Run `request` through the token/throttle/retry loop.
    ///
    /// Returns the first response that is neither an error status nor
    /// retryable; its body is left unread.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.request_url(request)?;
        let mut attempt: u32 = 0;
        let mut renewed = false;

        let mut access_token = match self.access_token().await {
            Some(token) => token,
            None => self.fetch_access_token().await?,
        };

        loop {
            self.throttle().await;
            let response = self.send(request, &url, &access_token).await?;
            let status = response.status();

            match status {
                // Name the URL we asked for, not where redirects ended up.
                StatusCode::NOT_FOUND => return Err(Error::NotFound(url.to_string())),
                StatusCode::FORBIDDEN => return Err(Error::Unauthorized(url.to_string())),
                StatusCode::UNAUTHORIZED if !renewed => {
                    warn!(path = %request.path, "access token rejected, renewing");
                    record_retry("renewal");
                    renewed = true;
                    access_token = self.fetch_access_token().await?;
                }
                StatusCode::UNAUTHORIZED => return Err(Error::BadOauthCredentials),
                s if s.as_u16() >= 500 && attempt < self.max_retry => {
                    let delay = backoff_delay(attempt);
                    attempt += 1;
                    warn!(
                        path = %request.path,
                        status = s.as_u16(),
                        attempt,
                        max_retry = self.max_retry,
                        delay_ms = delay.as_millis() as u64,
                        "backend error, retrying"
                    );
                    record_retry("backend");
                    tokio::time::sleep(delay).await;
                }
                s if s.as_u16() >= 500 => {
                    warn!(path = %request.path, status = s.as_u16(), attempt, "backend error, giving up");
                    return Err(Error::Backend);
                }
                _ => return Ok(response),
            }
        }
    }

    /// Absolute URL of `request`, query included.
    fn request_url(&self, request: &ApiRequest) -> Result<Url> {
        let raw = format!("{}{}", self.api_url, request.path);
        let mut url =
            Url::parse(&raw).map_err(|e| Error::Http(format!("invalid request URL {raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    async fn throttle(&self) {
        let in_progress = self.in_progress();
        let wait = self
            .rate_limiter
            .read()
            .await
            .should_wait(in_progress, MIN_REMAINING_REQUEST_THRESHOLD);
        if let Some(wait) = wait {
            info!(
                wait_secs = wait.as_secs(),
                in_progress, "rate limit nearly exhausted, waiting for reset"
            );
            record_throttle_wait();
            tokio::time::sleep(wait).await;
        }
    }

    async fn send(&self, request: &ApiRequest, url: &Url, access_token: &str) -> Result<Response> {
        let mut headers = request.headers.clone();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| Error::Http("access token is not a valid header value".into()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        let user_agent = HeaderValue::from_str(&self.credentials().user_agent)
            .map_err(|_| Error::Http("user agent is not a valid header value".into()))?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(headers);
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let sent = {
            let _in_flight = InFlight::enter(&self.in_progress);
            builder.send().await
        };
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                record_request("transport_error");
                warn!(method = %request.method, path = %request.path, error = %e, "request failed");
                return Err(Error::Http(e.to_string()));
            }
        };

        record_request(response.status().as_str());
        self.rate_limiter.write().await.observe(response.headers());
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status().as_u16(),
            "resource request completed"
        );
        Ok(response)
    }
}
