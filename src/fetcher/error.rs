// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use std::error::Error as _;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchErrorKind {
    Timeout,
    ConnectionError,
    DnsFailure,
    TlsFailure,
    UpstreamError,
}

impl FetchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::ConnectionError => "connection-error",
            FetchErrorKind::DnsFailure => "dns-failure",
            FetchErrorKind::TlsFailure => "tls-failure",
            FetchErrorKind::UpstreamError => "upstream-error",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport failure of a single outbound fetch
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let causes = cause_chain(&err);

        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_connect() {
            classify_connect_failure(&causes)
        } else {
            FetchErrorKind::UpstreamError
        };

        let message = if causes.is_empty() {
            err.to_string()
        } else {
            format!("{}: {}", err, causes)
        };

        FetchError::new(kind, message)
    }
}

/// reqwest only says "error sending request"; the cause is further down the chain.
/// Only the sources are collected, so keyword classification never sees the URL
/// embedded in the top-level message.
fn cause_chain(err: &reqwest::Error) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}

fn classify_connect_failure(message: &str) -> FetchErrorKind {
    let lowered = message.to_lowercase();

    if lowered.contains("dns error")
        || lowered.contains("failed to lookup address")
        || lowered.contains("name or service not known")
        || lowered.contains("no such host")
    {
        FetchErrorKind::DnsFailure
    } else if lowered.contains("certificate")
        || lowered.contains("tls")
        || lowered.contains("ssl")
        || lowered.contains("handshake")
    {
        FetchErrorKind::TlsFailure
    } else {
        FetchErrorKind::ConnectionError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dns_failure() {
        let message = "client error (Connect): dns error: failed to lookup address information: Name or service not known";
        assert_eq!(classify_connect_failure(message), FetchErrorKind::DnsFailure);
    }

    #[test]
    fn test_classify_tls_failure() {
        let message = "client error (Connect): invalid peer certificate: UnknownIssuer";
        assert_eq!(classify_connect_failure(message), FetchErrorKind::TlsFailure);
    }

    #[test]
    fn test_classify_refused() {
        let message = "client error (Connect): tcp connect error: Connection refused (os error 111)";
        assert_eq!(classify_connect_failure(message), FetchErrorKind::ConnectionError);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = FetchError::new(FetchErrorKind::Timeout, "operation timed out");
        assert_eq!(err.to_string(), "timeout: operation timed out");
    }
}
