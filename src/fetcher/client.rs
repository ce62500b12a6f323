// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::debug;

use crate::fetcher::error::FetchError;
use crate::fetcher::traits::{FetchedPage, Fetcher};

/// Hard bound on a single outbound fetch, connect through last body byte
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpClient {
    client: Client,
    max_body_bytes: usize,
}

impl HttpClient {
    pub fn new(max_body_bytes: usize) -> anyhow::Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT, max_body_bytes)
    }

    pub fn with_timeout(timeout: Duration, max_body_bytes: usize) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .no_proxy()
            .user_agent(concat!("fetchgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!(url = %url, "Sending outbound request");

        let mut response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await? {
            let remaining = self.max_body_bytes - body.len();
            if chunk.len() > remaining {
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, status, bytes = body.len(), truncated, "Outbound request completed");

        Ok(FetchedPage {
            status,
            size: body.len(),
            body: String::from_utf8_lossy(&body).into_owned(),
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::error::FetchErrorKind;
    use mockito::ServerGuard;

    async fn setup_mock_server() -> (ServerGuard, String) {
        let server = mockito::Server::new_async().await;
        let base_url = server.url();
        (server, base_url)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (mut server, base_url) = setup_mock_server().await;
        let client = HttpClient::new(1024).unwrap();

        let mock = server.mock("GET", "/data")
            .with_status(200)
            .with_body("{\"balance\": 42}")
            .create_async()
            .await;

        let page = client.fetch(&format!("{}/data", base_url)).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "{\"balance\": 42}");
        assert_eq!(page.size, 15);
        assert!(!page.truncated);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_not_a_failure() {
        let (mut server, base_url) = setup_mock_server().await;
        let client = HttpClient::new(1024).unwrap();

        let mock = server.mock("GET", "/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let page = client.fetch(&format!("{}/missing", base_url)).await.unwrap();
        assert_eq!(page.status, 404);
        assert_eq!(page.body, "not found");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_does_not_follow_redirects() {
        let (mut server, base_url) = setup_mock_server().await;
        let client = HttpClient::new(1024).unwrap();

        let redirect = server.mock("GET", "/hop")
            .with_status(302)
            .with_header("location", "http://169.254.169.254/latest/meta-data/")
            .create_async()
            .await;

        let page = client.fetch(&format!("{}/hop", base_url)).await.unwrap();
        assert_eq!(page.status, 302);

        redirect.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_truncates_large_body() {
        let (mut server, base_url) = setup_mock_server().await;
        let client = HttpClient::new(8).unwrap();

        let mock = server.mock("GET", "/big")
            .with_status(200)
            .with_body("0123456789abcdef")
            .create_async()
            .await;

        let page = client.fetch(&format!("{}/big", base_url)).await.unwrap();
        assert_eq!(page.body, "01234567");
        assert_eq!(page.size, 8);
        assert!(page.truncated);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(1024).unwrap();
        let err = client.fetch(&format!("http://{}/", addr)).await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::ConnectionError);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        // Accept connections but never answer
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let client = HttpClient::with_timeout(Duration::from_millis(200), 1024).unwrap();
        let err = client.fetch(&format!("http://{}/", addr)).await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Timeout);

        hold.abort();
    }
}
