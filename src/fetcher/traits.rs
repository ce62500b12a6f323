// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;

use crate::fetcher::error::FetchError;

/// Response of an outbound fetch, whatever its status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// Bytes received, capped at the configured maximum
    pub size: usize,
    /// Body was cut at the configured maximum
    pub truncated: bool,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform exactly one GET request; no retries, no redirects
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
