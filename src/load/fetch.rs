// src/load/fetch.rs

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use super::LoadError;

/// Retry policy for the HTTP fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Delay before retry number `attempt` (1-based); saturates instead of
/// overflowing.
fn backoff_delay(opts: &FetchOptions, attempt: u32) -> u64 {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    opts.backoff_ms.saturating_mul(factor)
}

async fn get_text_core(client: &Client, url: &Url) -> Result<String, reqwest::Error> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// GET `url` as text, backing off exponentially between failed attempts.
pub async fn get_text_with_retry(
    client: &Client,
    url: &Url,
    opts: &FetchOptions,
) -> Result<String, LoadError> {
    let mut attempts = 0;
    loop {
        match get_text_core(client, url).await {
            Ok(t) => return Ok(t),
            Err(e) if attempts < opts.retries => {
                attempts += 1;
                let backoff = backoff_delay(opts, attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(LoadError::Fetch {
                    url: url.clone(),
                    source: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{io::AsyncReadExt, io::AsyncWriteExt, net::TcpListener};

    /// One-shot HTTP server answering every connection with `body`.
    async fn serve(body: &'static str, status: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/pop.csv", addr)).unwrap()
    }

    #[test]
    fn test_backoff_doubles_then_saturates() {
        let opts = FetchOptions {
            retries: 100,
            backoff_ms: 500,
        };
        assert_eq!(backoff_delay(&opts, 1), 500);
        assert_eq!(backoff_delay(&opts, 3), 2000);
        assert_eq!(backoff_delay(&opts, 64), u64::MAX);
        assert_eq!(backoff_delay(&opts, 80), u64::MAX);

        let zero = FetchOptions {
            retries: 100,
            backoff_ms: 0,
        };
        assert_eq!(backoff_delay(&zero, 65), 0);
        assert_eq!(backoff_delay(&zero, 100), 0);
    }

    #[tokio::test]
    async fn test_many_retries_without_backoff() {
        let url = serve("gone", "404 Not Found").await;
        let opts = FetchOptions {
            retries: 70,
            backoff_ms: 0,
        };
        let err = get_text_with_retry(&Client::new(), &url, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = serve("Quarter,Canada\n", "200 OK").await;
        let text = get_text_with_retry(&Client::new(), &url, &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "Quarter,Canada\n");
    }

    #[tokio::test]
    async fn test_fetch_error_status_exhausts_retries() {
        let url = serve("gone", "404 Not Found").await;
        let opts = FetchOptions {
            retries: 2,
            backoff_ms: 1,
        };
        let err = get_text_with_retry(&Client::new(), &url, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }
}
