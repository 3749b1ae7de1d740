//! Rate-limit tracking from response headers
//!
//! Reddit reports the quota left in the current window and the seconds until
//! the window resets on every resource response. The limiter mirrors the
//! last values seen and asks callers to wait for the whole reset window once
//! the quota, minus calls already in flight, drops under a threshold.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

/// Header carrying the requests left in the current window.
pub const RATELIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the seconds until the window resets.
pub const RATELIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Requests kept in reserve before throttling starts.
pub const MIN_REMAINING_REQUEST_THRESHOLD: i64 = 5;

/// Last observed quota. Fields stay `None` until a response carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimiter {
    remaining: Option<i64>,
    reset_seconds: Option<u64>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> Option<i64> {
        self.remaining
    }

    pub fn reset_seconds(&self) -> Option<u64> {
        self.reset_seconds
    }

    /// Record the quota headers of a response. Last observation wins;
    /// absent or unparseable headers leave the previous value in place.
    pub fn observe(&mut self, headers: &HeaderMap) {
        if let Some(remaining) = header_integer(headers, RATELIMIT_REMAINING_HEADER) {
            self.remaining = Some(remaining);
        }
        if let Some(reset) = header_integer(headers, RATELIMIT_RESET_HEADER) {
            match u64::try_from(reset) {
                Ok(reset) => self.reset_seconds = Some(reset),
                Err(_) => debug!(value = reset, "ignoring negative rate-limit reset"),
            }
        }
    }

    /// How long to wait before the next send, if at all.
    ///
    /// Waits the full reset window rather than counting down to it.
    pub fn should_wait(&self, in_progress: usize, threshold: i64) -> Option<Duration> {
        let (remaining, reset) = (self.remaining?, self.reset_seconds?);
        let in_progress = i64::try_from(in_progress).unwrap_or(i64::MAX);
        if remaining.saturating_sub(in_progress) < threshold {
            Some(Duration::from_secs(reset))
        } else {
            None
        }
    }
}

/// Integer part of a header value. Reddit sends `remaining` as `"598.0"`.
fn header_integer(headers: &HeaderMap, name: &str) -> Option<i64> {
    let raw = headers.get(name)?.to_str().ok()?.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => {
            debug!(header = name, value = raw, "ignoring unparseable rate-limit header");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(remaining: Option<&'static str>, reset: Option<&'static str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(v) = remaining {
            map.insert(RATELIMIT_REMAINING_HEADER, HeaderValue::from_static(v));
        }
        if let Some(v) = reset {
            map.insert(RATELIMIT_RESET_HEADER, HeaderValue::from_static(v));
        }
        map
    }

    fn observed(remaining: &'static str, reset: &'static str) -> RateLimiter {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(Some(remaining), Some(reset)));
        limiter
    }

    #[test]
    fn no_wait_before_any_observation() {
        let limiter = RateLimiter::new();
        assert_eq!(limiter.should_wait(0, MIN_REMAINING_REQUEST_THRESHOLD), None);
        assert_eq!(limiter.should_wait(100, MIN_REMAINING_REQUEST_THRESHOLD), None);
    }

    #[test]
    fn no_wait_with_only_one_header_seen() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(Some("0"), None));
        assert_eq!(limiter.should_wait(0, MIN_REMAINING_REQUEST_THRESHOLD), None);
    }

    #[test]
    fn waits_full_window_below_threshold() {
        let limiter = observed("4", "9");
        assert_eq!(
            limiter.should_wait(0, MIN_REMAINING_REQUEST_THRESHOLD),
            Some(Duration::from_secs(9))
        );
    }

    #[test]
    fn no_wait_at_threshold() {
        let limiter = observed("5", "9");
        assert_eq!(limiter.should_wait(0, MIN_REMAINING_REQUEST_THRESHOLD), None);
    }

    #[test]
    fn in_flight_calls_count_against_quota() {
        let limiter = observed("7", "30");
        assert_eq!(limiter.should_wait(2, MIN_REMAINING_REQUEST_THRESHOLD), None);
        assert_eq!(
            limiter.should_wait(3, MIN_REMAINING_REQUEST_THRESHOLD),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn decimal_remaining_uses_integer_part() {
        let limiter = observed("598.0", "412");
        assert_eq!(limiter.remaining(), Some(598));
        assert_eq!(limiter.reset_seconds(), Some(412));
    }

    #[test]
    fn last_observation_wins() {
        let mut limiter = observed("600", "500");
        limiter.observe(&headers(Some("3"), Some("12")));
        assert_eq!(limiter.remaining(), Some(3));
        assert_eq!(limiter.reset_seconds(), Some(12));
    }

    #[test]
    fn missing_or_garbage_headers_keep_previous_values() {
        let mut limiter = observed("42", "60");
        limiter.observe(&HeaderMap::new());
        limiter.observe(&headers(Some("lots"), Some("-3")));
        assert_eq!(limiter.remaining(), Some(42));
        assert_eq!(limiter.reset_seconds(), Some(60));
    }
}
