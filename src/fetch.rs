//! Retrieval of the listing page.
//!
//! [`FetchHtml`] is the seam the pipeline depends on: production runs use
//! [`HttpFetcher`], tests substitute canned markup. A fetch never fails the
//! process; every transport problem is logged and reported as "no data".

use crate::error::FetchError;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Desktop browser identity sent with every request; the listing site filters
/// obvious bot user agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Implemented by `HttpFetcher` and test doubles only. The pipeline is generic
// over it and never boxes it, so the future's `Send`-ness is inferred from the
// concrete type at each call site.
#[allow(async_fn_in_trait)]
pub trait FetchHtml {
    /// Retrieve `url` as text, or `None` if nothing usable came back.
    async fn fetch_html(&self, url: &str) -> Option<String>;
}

/// Single-shot HTTP GET with a bounded timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Like [`FetchHtml::fetch_html`] but keeps the failure reason.
    pub async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

impl FetchHtml for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_html(&self, url: &str) -> Option<String> {
        let t0 = Instant::now();
        let res = self.try_fetch(url).await;
        let dt = t0.elapsed();

        match res {
            Ok(body) => {
                info!(
                    bytes = body.len(),
                    elapsed_ms = dt.as_millis() as u64,
                    "Fetched listing page"
                );
                Some(body)
            }
            Err(e) => {
                warn!(
                    elapsed_ms = dt.as_millis() as u64,
                    timeout_secs = self.timeout.as_secs(),
                    error = %e,
                    "Network error"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Answer one request with `response`, handing back what the client sent.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf[..n]).to_string()
        });
        (format!("http://{addr}/"), handle)
    }

    #[test]
    fn test_http_fetcher_builds() {
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(fetcher.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_fetch_success_sends_browser_identity() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 15\r\nConnection: close\r\n\r\n<html>ok</html>",
        )
        .await;
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT).unwrap();

        let body = fetcher.fetch_html(&url).await;
        assert_eq!(body.as_deref(), Some("<html>ok</html>"));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get / "));
        assert!(request.contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let (url, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT).unwrap();

        assert!(matches!(
            fetcher.try_fetch(&url).await,
            Err(FetchError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let (url, _server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT).unwrap();

        assert!(fetcher.fetch_html(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_refused_connection_yields_none() {
        // grab a free port, then close it so nothing is listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, Duration::from_secs(2)).unwrap();

        let url = format!("http://127.0.0.1:{port}/");
        assert!(fetcher.fetch_html(&url).await.is_none());
        assert!(matches!(
            fetcher.try_fetch(&url).await,
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_gives_up_on_silent_server() {
        // accepts connections and holds them open without answering
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let body = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch_html(&url))
            .await
            .expect("fetch outlived its timeout");
        assert!(body.is_none());
        assert!(start.elapsed() < Duration::from_secs(5));

        let result = tokio::time::timeout(Duration::from_secs(5), fetcher.try_fetch(&url))
            .await
            .expect("fetch outlived its timeout");
        assert!(matches!(result, Err(FetchError::Transport(e)) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_yields_none() {
        let fetcher = HttpFetcher::new(BROWSER_USER_AGENT, Duration::from_secs(2)).unwrap();
        assert!(fetcher.fetch_html("not a url").await.is_none());
    }
}
