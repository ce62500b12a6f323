// SPDX-License-Identifier: GPL-3.0-only
use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::PolicyConfig;

/// Read-only allow/deny policy shared by every request.
///
/// Built once at startup; there is no way to change it afterwards.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    allowed_domains: Vec<String>,
    blocked_addresses: HashSet<String>,
    blocked_ports: HashSet<u16>,
}

impl Policy {
    pub fn new<D, A, P>(allowed_domains: D, blocked_addresses: A, blocked_ports: P) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: AsRef<str>,
        P: IntoIterator<Item = u16>,
    {
        Self {
            allowed_domains: allowed_domains.into_iter().map(Into::into).collect(),
            blocked_addresses: blocked_addresses
                .into_iter()
                .map(|addr| canonical_address(addr.as_ref()))
                .collect(),
            blocked_ports: blocked_ports.into_iter().collect(),
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.allowed_domains.iter().cloned(),
            config.blocked_addresses.iter(),
            config.blocked_ports.iter().copied(),
        )
    }

    /// Literal suffix match, case-sensitive.
    ///
    /// `eviltrusted-website.com` matches `trusted-website.com`, as does any IP
    /// literal that happens to end with a configured suffix.
    pub fn is_domain_allowed(&self, hostname: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|suffix| hostname.ends_with(suffix.as_str()))
    }

    /// `ip` must already be in canonical form (`IpAddr::to_string`)
    pub fn is_address_blocked(&self, ip: &str) -> bool {
        self.blocked_addresses.contains(ip)
    }

    pub fn is_port_blocked(&self, port: u16) -> bool {
        self.blocked_ports.contains(&port)
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }
}

/// IP literals are stored the way `IpAddr` prints them so `::0` and `::` compare equal.
/// Anything else is kept verbatim and can never match a parsed address.
fn canonical_address(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    match trimmed.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}
