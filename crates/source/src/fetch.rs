use crate::error::{ErrorKind, Result};
use crate::{USER_AGENT, retry::RetryPolicy};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

/// Loads stored response bodies.
#[async_trait]
pub trait BodyFetcher: Send + Sync {
    /// Raw bytes stored at `url`.
    ///
    /// Fails with [`NotFound`](ErrorKind::NotFound) when nothing is stored
    /// there; any other failure is reported only after retrying.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`BodyFetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl BodyFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.retry.send(url, || self.client.get(url).query(&[("different", "false")])).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(url.to_string()));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16() });
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network(url.to_string()))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, serve};

    fn fetcher(retries: u32) -> HttpFetcher {
        let retry = RetryPolicy { retries, base_delay: Duration::from_millis(1) };
        HttpFetcher::new(Duration::from_secs(5), retry).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_body() {
        let server = serve(vec![Reply::new(200, b"<html>hi</html>")]).await;
        let body = fetcher(0).fetch(&server.url("/body/1")).await.unwrap();
        assert_eq!(body, b"<html>hi</html>");
        assert_eq!(server.requests(), ["GET /body/1?different=false"]);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = serve(vec![Reply::new(404, b"missing")]).await;
        let err = fetcher(3).fetch(&server.url("/body/2")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_retried() {
        let server = serve(vec![Reply::new(503, b""), Reply::new(500, b""), Reply::new(200, b"finally")]).await;
        let body = fetcher(3).fetch(&server.url("/body/3")).await.unwrap();
        assert_eq!(body, b"finally");
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let server = serve(vec![Reply::new(502, b""), Reply::new(502, b"")]).await;
        let err = fetcher(1).fetch(&server.url("/body/4")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status { status: 502, .. }));
        assert!(err.is_retryable());
    }
}
