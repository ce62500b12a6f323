// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "Unknown log format: {} (expected pretty or json)",
                other
            )),
        }
    }
}

/// Allow/deny lists the gate enforces on every fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hostname suffixes a fetch target must end with
    pub allowed_domains: Vec<String>,

    /// Literal addresses that are always treated as internal
    pub blocked_addresses: Vec<String>,

    /// Ports that may not be named explicitly in a target URL
    pub blocked_ports: Vec<u16>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec![String::from("trusted-website.com")],
            blocked_addresses: vec![
                String::from("0.0.0.0"),
                String::from("::"),
                String::from("169.254.169.254"),
                String::from("100.100.100.200"),
            ],
            blocked_ports: vec![22, 23, 25, 445, 3306, 3389, 5432, 6379, 9200, 11211, 27017],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API bind address (e.g., "127.0.0.1:5000")
    pub bind: SocketAddr,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Number of recent attempts kept for display
    pub attempt_log_capacity: usize,

    /// Upper bound on how much of an upstream body is read
    pub max_response_bytes: usize,

    pub policy: PolicyConfig,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("FETCHGATE_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.check()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(val) = std::env::var("FETCHGATE_BIND") {
            self.bind = SocketAddr::from_str(&val)?;
        }
        if let Ok(val) = std::env::var("FETCHGATE_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Ok(val) = std::env::var("FETCHGATE_LOG_FORMAT") {
            self.log_format = val.parse()?;
        }
        if let Ok(val) = std::env::var("FETCHGATE_ATTEMPT_LOG_CAPACITY") {
            self.attempt_log_capacity = val.parse()?;
        }
        if let Ok(val) = std::env::var("FETCHGATE_MAX_RESPONSE_BYTES") {
            self.max_response_bytes = val.parse()?;
        }
        if let Ok(val) = std::env::var("FETCHGATE_ALLOWED_DOMAINS") {
            self.policy.allowed_domains = split_list(&val);
        }
        if let Ok(val) = std::env::var("FETCHGATE_BLOCKED_ADDRESSES") {
            self.policy.blocked_addresses = split_list(&val);
        }
        if let Ok(val) = std::env::var("FETCHGATE_BLOCKED_PORTS") {
            self.policy.blocked_ports = split_list(&val)
                .iter()
                .map(|port| port.parse::<u16>())
                .collect::<Result<_, _>>()?;
        }

        Ok(())
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.attempt_log_capacity == 0 {
            return Err(anyhow::anyhow!("attempt_log_capacity must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            log_level: String::from("info"),
            log_format: LogFormat::Pretty,
            attempt_log_capacity: 10,
            max_response_bytes: 1024 * 1024,
            policy: PolicyConfig::default(),
        }
    }
}

/// Split a comma separated env value, dropping empty items
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
