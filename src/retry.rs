//! Bounded retry for outbound JSON calls to embedding and chat services

use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Retry policy applied to one external call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means a single try
    pub max_retries: usize,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: usize) -> Self {
        Self { max_retries }
    }

    /// 429 and 5xx are worth another try; other statuses are final
    #[must_use]
    pub fn should_retry(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn is_retryable_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_body() || err.is_request()
    }

    /// Delay before retry number `attempt` (0-based): 500ms doubled per
    /// retry, exponent capped at 5
    #[must_use]
    pub fn backoff(attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        Duration::from_millis(500 * (1 << capped))
    }

    fn has_attempts_left(&self, attempt: usize) -> bool {
        attempt < self.max_retries
    }

    /// POST `body` as JSON and decode the JSON reply.
    ///
    /// Errors are returned as a message so callers can wrap them in their
    /// own error variant.
    pub async fn post_json<B, R>(
        &self,
        client: &Client,
        url: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> std::result::Result<R, String>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut attempt = 0usize;
        loop {
            let mut request = client.post(url).json(body);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<R>()
                            .await
                            .map_err(|e| format!("Failed to parse response: {e}"));
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if Self::should_retry(status) && self.has_attempts_left(attempt) {
                        let delay = Self::backoff(attempt);
                        attempt += 1;
                        warn!("{url} returned {status}, retry {attempt} in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(format!("request failed ({status}): {body}"));
                }
                Err(err) => {
                    if Self::is_retryable_error(&err) && self.has_attempts_left(attempt) {
                        let delay = Self::backoff(attempt);
                        attempt += 1;
                        warn!("{url} unreachable ({err}), retry {attempt} in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(err.to_string());
                }
            }
        }
    }
}
