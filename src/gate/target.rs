// SPDX-License-Identifier: GPL-3.0-only
use url::{Host, Url};

/// Components of a fetch target, as parsed from the raw URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    /// IP literal or DNS name. IPv6 literals carry no brackets.
    pub hostname: String,
    /// Port as written in the URL, even when it equals the scheme default
    pub port: Option<u16>,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    /// Host component absent or not a valid host
    Hostname,
    /// Anything else structurally wrong with the URL
    Malformed,
}

impl ParsedUrl {
    pub fn parse(raw: &str) -> Result<Self, ParseFailure> {
        let url = Url::parse(raw.trim()).map_err(|e| match e {
            url::ParseError::EmptyHost
            | url::ParseError::IdnaError
            | url::ParseError::InvalidIpv4Address
            | url::ParseError::InvalidIpv6Address
            | url::ParseError::InvalidDomainCharacter => ParseFailure::Hostname,
            _ => ParseFailure::Malformed,
        })?;

        let hostname = host_name(url.host()).ok_or(ParseFailure::Hostname)?;

        let port = url.port().or_else(|| written_default_port(raw, &url));

        Ok(Self {
            scheme: url.scheme().to_string(),
            hostname,
            port,
            path: url.path().to_string(),
        })
    }
}

/// Best-effort host for input `parse` refuses for reasons other than the host,
/// such as an out-of-range port.
pub fn host_hint(raw: &str) -> Option<String> {
    let host_port = written_host_port(raw)?;
    let (host, _) = split_port(&host_port);
    host_name(Host::parse(host).ok())
}

fn host_name<S: AsRef<str>>(host: Option<Host<S>>) -> Option<String> {
    match host? {
        Host::Domain(domain) if !domain.as_ref().is_empty() => Some(domain.as_ref().to_string()),
        Host::Domain(_) => None,
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}

/// `Url` drops a port equal to the scheme default (`http://host:80/`), so look
/// for it in the authority as written.
fn written_default_port(raw: &str, url: &Url) -> Option<u16> {
    let default = url.port_or_known_default()?;
    let host_port = written_host_port(raw)?;
    let port = split_port(&host_port).1?.parse::<u16>().ok()?;
    (port == default).then_some(port)
}

/// Host and port as the `url` parser reads them for special schemes: tabs and
/// newlines removed, any run of `/` or `\` after the scheme skipped, userinfo
/// dropped, authority ended by `/`, `\`, `?` or `#`.
fn written_host_port(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();
    let (_, rest) = cleaned.split_once(':')?;
    let authority = rest
        .trim_start_matches(['/', '\\'])
        .split(['/', '\\', '?', '#'])
        .next()?;
    authority.rsplit('@').next().map(str::to_string)
}

fn split_port(host_port: &str) -> (&str, Option<&str>) {
    match host_port.rfind(']') {
        Some(end) => (&host_port[..=end], host_port[end + 1..].strip_prefix(':')),
        None => match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        },
    }
}
