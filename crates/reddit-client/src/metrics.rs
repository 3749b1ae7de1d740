//! Client-side metric recording
//!
//! Records through the `metrics` facade; whoever embeds the client decides
//! which recorder (if any) is installed.
//!
//! - `reddit_requests_total` (counter): label `status` (status code or `transport_error`)
//! - `reddit_token_fetches_total` (counter): label `grant`
//! - `reddit_retries_total` (counter): label `reason` (`renewal`, `backend`)
//! - `reddit_throttle_waits_total` (counter)

/// Record one transport attempt against the resource API.
pub fn record_request(status: &str) {
    metrics::counter!("reddit_requests_total", "status" => status.to_string()).increment(1);
}

/// Record a successful token acquisition for the given grant label.
pub fn record_token_fetch(grant: &str) {
    metrics::counter!("reddit_token_fetches_total", "grant" => grant.to_string()).increment(1);
}

/// Record a retry of a logical call.
pub fn record_retry(reason: &str) {
    metrics::counter!("reddit_retries_total", "reason" => reason.to_string()).increment(1);
}

/// Record a send delayed by the rate limiter.
pub fn record_throttle_wait() {
    metrics::counter!("reddit_throttle_waits_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request("200");
        record_token_fetch("refresh_token");
        record_retry("backend");
        record_throttle_wait();
    }

    #[test]
    fn request_counter_carries_status_label() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request("200");
        record_request("502");
        record_request("502");

        let output = handle.render();
        assert!(output.contains("reddit_requests_total{status=\"200\"} 1"), "{output}");
        assert!(output.contains("reddit_requests_total{status=\"502\"} 2"), "{output}");
    }

    #[test]
    fn token_retry_and_throttle_counters_render() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_token_fetch("app_only");
        record_retry("renewal");
        record_throttle_wait();

        let output = handle.render();
        assert!(output.contains("reddit_token_fetches_total{grant=\"app_only\"} 1"), "{output}");
        assert!(output.contains("reddit_retries_total{reason=\"renewal\"} 1"), "{output}");
        assert!(output.contains("reddit_throttle_waits_total 1"), "{output}");
    }
}
