// SPDX-License-Identifier: GPL-3.0-only
pub mod client;
pub mod error;
pub mod traits;

pub use client::HttpClient;
pub use error::FetchError;
pub use traits::Fetcher;
