use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// How often and how patiently to retry a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    /// Delay before the first retry; doubles on every further attempt.
    pub base_delay: Duration,
}
impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 3, base_delay: Duration::from_millis(500) }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { retries: 0, base_delay: Duration::ZERO }
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        let capped = attempt.saturating_sub(1).min(5);
        self.base_delay * (1 << capped)
    }

    /// Send the request built by `build` until it gets a response worth
    /// returning. Throttling and server errors are retried, and so are
    /// network failures; any other status is handed back to the caller.
    pub(crate) async fn send(&self, url: &str, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            match build().send().await {
                Ok(response) if should_retry(response.status()) && attempt < self.retries => {
                    attempt += 1;
                    debug!(url, status = response.status().as_u16(), attempt, "Retrying request");
                },
                Ok(response) => return Ok(response),
                Err(err) if is_retryable_error(&err) && attempt < self.retries => {
                    attempt += 1;
                    debug!(url, error = %err, attempt, "Retrying request");
                },
                Err(err) => return Err(err).or_raise(|| ErrorKind::Network(url.to_string())),
            }
            tokio::time::sleep(self.backoff(attempt)).await;
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body() || err.is_request()
}
