//! Resilient fetcher: credentialed GET with bounded linear-backoff retries.
//!
//! Transient upstream hiccups are absorbed here so callers only see an
//! error once every attempt has failed. There is no jitter, no delay cap
//! and no circuit breaker; the attempt count is the only bound.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::ports::HttpTransport;
use crate::DashError;

/// Default number of attempts per fetch.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit: attempt `n` waits `n * 250ms` after failing.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(250);

/// Retry parameters for [`fetch_json_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Same base delay, different attempt count.
    #[must_use]
    pub fn with_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..self
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// At least one attempt is always made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// GET `path` and decode its JSON body, retrying on failure.
///
/// A non-2xx status, a transport error or an undecodable body all count as
/// a failed attempt. After failed attempt `n` the fetcher sleeps
/// `policy.delay_after(n)`; once all attempts are spent the last error is
/// returned.
///
/// # Errors
/// Returns the error of the final attempt.
pub async fn fetch_json_with_retry<T, H>(
    transport: &H,
    path: &str,
    policy: RetryPolicy,
) -> Result<T, DashError>
where
    T: DeserializeOwned,
    H: HttpTransport + ?Sized,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match fetch_once(transport, path).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("GET {} succeeded on attempt {}/{}", path, attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "GET {} failed (attempt {}/{}): {}; retrying in {}ms",
                    path,
                    attempt,
                    attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!("GET {} failed after {} attempts: {}", path, attempts, e);
                return Err(e);
            }
        }
    }
}

async fn fetch_once<T, H>(transport: &H, path: &str) -> Result<T, DashError>
where
    T: DeserializeOwned,
    H: HttpTransport + ?Sized,
{
    let response = transport.get(path).await?;

    if !response.is_success() {
        return Err(DashError::Status {
            path: path.to_string(),
            status: response.status,
            message: response.error_message(),
        });
    }

    response.decode().map_err(|source| DashError::Decode {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{HttpResponse, TransportError};
    use crate::testing::ScriptedTransport;

    fn refused() -> Result<HttpResponse, TransportError> {
        Err(TransportError::Request("connection refused".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let transport = ScriptedTransport::new()
            .reply("GET", "/history", refused())
            .reply("GET", "/history", Ok(HttpResponse::new(503, "busy")))
            .ok_json("GET", "/history", serde_json::json!([{"bmi": 22.1}]));

        let records: Vec<crate::Record> =
            fetch_json_with_retry(&transport, "/history", RetryPolicy::default())
                .await
                .expect("Third attempt should succeed");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bmi, Some(22.1));
        assert_eq!(transport.calls_to("/history").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_exactly_three_attempts_with_linear_delays() {
        let transport = ScriptedTransport::new().reply("GET", "/clinician-data", refused());

        let result: Result<serde_json::Value, _> =
            fetch_json_with_retry(&transport, "/clinician-data", RetryPolicy::default()).await;

        assert!(matches!(result, Err(DashError::Transport(_))));

        let calls = transport.calls_to("/clinician-data");
        assert_eq!(calls.len(), 3);

        let first_gap = calls[1].at - calls[0].at;
        let second_gap = calls[2].at - calls[1].at;
        assert!(first_gap >= Duration::from_millis(250) && first_gap < Duration::from_millis(260));
        assert!(second_gap >= Duration::from_millis(500) && second_gap < Duration::from_millis(510));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_error_is_propagated() {
        let transport = ScriptedTransport::new()
            .reply("GET", "/whoami", refused())
            .reply("GET", "/whoami", Ok(HttpResponse::new(500, "{\"error\": \"boom\"}")));

        let result: Result<serde_json::Value, _> =
            fetch_json_with_retry(&transport, "/whoami", RetryPolicy::default()).await;

        match result {
            Err(DashError::Status {
                status, message, ..
            }) => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some("boom"));
            }
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_counts_as_failure() {
        let transport = ScriptedTransport::new()
            .reply("GET", "/history", Ok(HttpResponse::new(200, "<html>")))
            .ok_json("GET", "/history", serde_json::json!([]));

        let records: Vec<crate::Record> =
            fetch_json_with_retry(&transport, "/history", RetryPolicy::default())
                .await
                .expect("Second attempt should succeed");

        assert!(records.is_empty());
        assert_eq!(transport.calls_to("/history").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let transport = ScriptedTransport::new().reply("GET", "/history", refused());

        let result: Result<serde_json::Value, _> =
            fetch_json_with_retry(&transport, "/history", RetryPolicy::default().with_attempts(0))
                .await;

        assert!(result.is_err());
        assert_eq!(transport.calls_to("/history").len(), 1);
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(250));
        assert_eq!(policy.delay_after(2), Duration::from_millis(500));
        assert_eq!(policy.delay_after(3), Duration::from_millis(750));
    }
}
