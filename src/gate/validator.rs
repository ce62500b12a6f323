// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::gate::classifier::classify;
use crate::gate::policy::Policy;
use crate::gate::target::{ParseFailure, ParsedUrl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    InvalidUrl,
    InvalidScheme,
    InvalidHostname,
    InternalIpBlocked,
    DomainNotAllowlisted,
    PortBlocked,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::InvalidUrl => "invalid-url",
            RejectReason::InvalidScheme => "invalid-scheme",
            RejectReason::InvalidHostname => "invalid-hostname",
            RejectReason::InternalIpBlocked => "internal-ip-blocked",
            RejectReason::DomainNotAllowlisted => "domain-not-allowlisted",
            RejectReason::PortBlocked => "port-blocked",
        }
    }

    /// Human readable explanation shown to the caller
    pub fn describe(self) -> &'static str {
        match self {
            RejectReason::InvalidUrl => "Malformed URL",
            RejectReason::InvalidScheme => "Only http and https URLs are allowed",
            RejectReason::InvalidHostname => "URL has no valid hostname",
            RejectReason::InternalIpBlocked => "Access to internal addresses is blocked",
            RejectReason::DomainNotAllowlisted => "Domain is not on the allowlist",
            RejectReason::PortBlocked => "Access to this port is blocked",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

/// Structural validation of a fetch target. No network access.
pub fn validate(raw: &str, policy: &Policy) -> Verdict {
    let parsed = match ParsedUrl::parse(raw) {
        Ok(parsed) => parsed,
        Err(ParseFailure::Hostname) => return Verdict::Rejected(RejectReason::InvalidHostname),
        Err(ParseFailure::Malformed) => return Verdict::Rejected(RejectReason::InvalidUrl),
    };

    match check(&parsed, policy) {
        Some(reason) => Verdict::Rejected(reason),
        None => {
            debug!(
                host = %parsed.hostname,
                port = ?parsed.port,
                path = %parsed.path,
                "Target passed validation"
            );
            Verdict::Accepted
        }
    }
}

fn check(parsed: &ParsedUrl, policy: &Policy) -> Option<RejectReason> {
    let scheme = parsed.scheme.as_str();
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Some(RejectReason::InvalidScheme);
    }

    if classify(&parsed.hostname, policy).is_internal() {
        return Some(RejectReason::InternalIpBlocked);
    }

    if !policy.is_domain_allowed(&parsed.hostname) {
        return Some(RejectReason::DomainNotAllowlisted);
    }

    if parsed.port.is_some_and(|port| policy.is_port_blocked(port)) {
        return Some(RejectReason::PortBlocked);
    }

    None
}
