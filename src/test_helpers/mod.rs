// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Config;
use crate::fetcher::error::{FetchError, FetchErrorKind};
use crate::fetcher::traits::{FetchedPage, Fetcher};
use crate::gate::Policy;

/// Policy allowing `example.com` and its subdomains, default blocklists
pub fn test_policy() -> Policy {
    Policy::from_config(&create_test_config().policy)
}

/// Create a test configuration bound to an ephemeral port
pub fn create_test_config() -> Config {
    let mut config = Config {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)), // Use port 0 to auto-assign
        log_level: "error".to_string(), // Reduce log noise in tests
        ..Config::default()
    };
    config.policy.allowed_domains = vec!["example.com".to_string()];
    config
}

/// In-memory fetcher that records how often it was asked to go to the network
pub struct StubFetcher {
    response: Result<FetchedPage, FetchError>,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl StubFetcher {
    pub fn ok(status: u16, body: &str) -> Self {
        Self::with_response(Ok(FetchedPage {
            status,
            body: body.to_string(),
            size: body.len(),
            truncated: false,
        }))
    }

    pub fn err(kind: FetchErrorKind, message: &str) -> Self {
        Self::with_response(Err(FetchError::new(kind, message)))
    }

    fn with_response(response: Result<FetchedPage, FetchError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().expect("stub lock").clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().expect("stub lock") = Some(url.to_string());
        self.response.clone()
    }
}
