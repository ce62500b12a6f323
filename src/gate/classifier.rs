// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::gate::policy::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpClassification {
    Private,
    Loopback,
    LinkLocal,
    Multicast,
    ExplicitlyBlocked,
    NotAnIp,
    Public,
}

impl IpClassification {
    pub fn is_internal(self) -> bool {
        !matches!(self, IpClassification::NotAnIp | IpClassification::Public)
    }
}

/// Classify a hostname without resolving it.
///
/// Only IP literals are inspected. A DNS name is `NotAnIp` even if it would
/// resolve to a private address.
pub fn classify(hostname: &str, policy: &Policy) -> IpClassification {
    let literal = hostname.trim_start_matches('[').trim_end_matches(']');
    match literal.parse::<IpAddr>() {
        Ok(ip) => classify_ip(ip, policy),
        Err(_) => IpClassification::NotAnIp,
    }
}

pub fn classify_ip(ip: IpAddr, policy: &Policy) -> IpClassification {
    match ip {
        IpAddr::V4(v4) => classify_v4(v4, policy),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => classify_v4(v4, policy),
            None => classify_v6(v6, policy),
        },
    }
}

fn classify_v4(ip: Ipv4Addr, policy: &Policy) -> IpClassification {
    if ip.is_private() {
        IpClassification::Private
    } else if ip.is_loopback() {
        IpClassification::Loopback
    } else if ip.is_link_local() {
        IpClassification::LinkLocal
    } else if ip.is_multicast() {
        IpClassification::Multicast
    } else if policy.is_address_blocked(&ip.to_string()) {
        IpClassification::ExplicitlyBlocked
    } else {
        IpClassification::Public
    }
}

fn classify_v6(ip: Ipv6Addr, policy: &Policy) -> IpClassification {
    if ip.is_unique_local() {
        IpClassification::Private
    } else if ip.is_loopback() {
        IpClassification::Loopback
    } else if ip.is_unicast_link_local() {
        IpClassification::LinkLocal
    } else if ip.is_multicast() {
        IpClassification::Multicast
    } else if policy.is_address_blocked(&ip.to_string()) {
        IpClassification::ExplicitlyBlocked
    } else {
        IpClassification::Public
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_policy;

    #[test]
    fn test_rfc1918_is_private() {
        let policy = test_policy();
        for host in ["10.0.0.1", "192.168.1.1", "172.16.0.1", "172.31.255.254"] {
            assert_eq!(classify(host, &policy), IpClassification::Private, "{host}");
            assert!(classify(host, &policy).is_internal());
        }
        assert_eq!(classify("172.32.0.1", &policy), IpClassification::Public);
    }

    #[test]
    fn test_loopback() {
        let policy = test_policy();
        assert_eq!(classify("127.0.0.1", &policy), IpClassification::Loopback);
        assert_eq!(classify("127.8.9.10", &policy), IpClassification::Loopback);
        assert_eq!(classify("::1", &policy), IpClassification::Loopback);
        assert_eq!(classify("[::1]", &policy), IpClassification::Loopback);
    }

    #[test]
    fn test_metadata_address_is_internal() {
        let policy = test_policy();
        let class = classify("169.254.169.254", &policy);
        assert_eq!(class, IpClassification::LinkLocal);
        assert!(class.is_internal());
    }

    #[test]
    fn test_multicast() {
        let policy = test_policy();
        assert_eq!(classify("224.0.0.1", &policy), IpClassification::Multicast);
        assert_eq!(classify("ff02::1", &policy), IpClassification::Multicast);
    }

    #[test]
    fn test_ipv6_ranges() {
        let policy = test_policy();
        assert_eq!(classify("fd12:3456::1", &policy), IpClassification::Private);
        assert_eq!(classify("fe80::1", &policy), IpClassification::LinkLocal);
        assert_eq!(classify("2001:4860:4860::8888", &policy), IpClassification::Public);
    }

    #[test]
    fn test_ipv4_mapped_ipv6_uses_embedded_address() {
        let policy = test_policy();
        assert_eq!(classify("::ffff:127.0.0.1", &policy), IpClassification::Loopback);
        assert_eq!(classify("::ffff:10.0.0.1", &policy), IpClassification::Private);
        assert_eq!(classify("::ffff:8.8.8.8", &policy), IpClassification::Public);
    }

    #[test]
    fn test_explicit_blocklist() {
        let policy = test_policy();
        assert_eq!(classify("0.0.0.0", &policy), IpClassification::ExplicitlyBlocked);
        assert_eq!(classify("::", &policy), IpClassification::ExplicitlyBlocked);
        assert_eq!(classify("100.100.100.200", &policy), IpClassification::ExplicitlyBlocked);
    }

    #[test]
    fn test_names_are_not_resolved() {
        let policy = test_policy();
        assert_eq!(classify("localhost", &policy), IpClassification::NotAnIp);
        assert_eq!(classify("api.example.com", &policy), IpClassification::NotAnIp);
        assert_eq!(classify("", &policy), IpClassification::NotAnIp);
        assert!(!classify("localhost", &policy).is_internal());
    }

    #[test]
    fn test_public_address() {
        let policy = test_policy();
        assert_eq!(classify("8.8.8.8", &policy), IpClassification::Public);
        assert_eq!(classify("93.184.216.34", &policy), IpClassification::Public);
    }
}
