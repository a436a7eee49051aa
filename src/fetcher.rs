//! Page fetching over HTTP.
//!
//! [`PageFetcher`] is the seam between the extractor and the network: one
//! call, one GET, body or a typed [`FetchError`]. [`HttpFetcher`] is the
//! `reqwest` implementation. It owns the connection pool, so dropping it at the
//! end of a run closes every pooled connection whether the run succeeded or not.

use crate::config::HttpConfig;
use crate::error::{ConfigError, FetchError};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// A single HTTP GET returning the response body.
///
/// Implementations must not retry; see [`crate::retry::RetryFetch`] for
/// caller-side retries.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: PageFetcher> PageFetcher for &F {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// `reqwest`-backed fetcher with a per-request timeout and a pooled client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Non-success status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(timeout_secs: u64) -> HttpConfig {
        HttpConfig {
            timeout_secs,
            ..HttpConfig::default()
        }
    }

    /// Accept one connection, read the request, reply with `response`.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/page")
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 5\r\n\
             Connection: close\r\n\r\nhello",
        )
        .await;
        let fetcher = HttpFetcher::new(&config(5)).unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_non_success_status_is_terminal_error() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::new(&config(5)).unwrap();
        assert_eq!(
            fetcher.fetch(&url).await.unwrap_err(),
            FetchError::HttpStatus(404)
        );
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let fetcher = HttpFetcher::new(&config(1)).unwrap();
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&config(5)).unwrap();
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    }
}
