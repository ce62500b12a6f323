// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;

use crate::gate::classifier::classify;
use crate::gate::policy::Policy;
use crate::gate::target::{host_hint, ParsedUrl};

const SUSPICIOUS_KEYWORDS: &[&str] = &["admin", "internal", "secure", "private"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    #[serde(rename = "risk_level")]
    pub level: RiskLevel,
    #[serde(rename = "risk_factors")]
    pub factors: Vec<String>,
}

impl RiskAssessment {
    fn low() -> Self {
        Self {
            level: RiskLevel::Low,
            factors: Vec::new(),
        }
    }

    /// Record a factor and raise the level; never lowers it
    fn raise(&mut self, level: RiskLevel, factor: impl Into<String>) {
        self.factors.push(factor.into());
        self.level = self.level.max(level);
    }

    pub fn is_high(&self) -> bool {
        self.level == RiskLevel::High
    }
}

/// Score how attack-like a URL looks.
///
/// Runs on the raw string without touching the network, so it is safe to call
/// on anything a client sends. Factors are listed in evaluation order.
pub fn assess(raw: &str, policy: &Policy) -> RiskAssessment {
    let mut assessment = RiskAssessment::low();

    let (hostname, port) = match ParsedUrl::parse(raw) {
        Ok(parsed) => (Some(parsed.hostname), parsed.port),
        Err(_) => (host_hint(raw), None),
    };

    if hostname.is_some_and(|host| classify(&host, policy).is_internal()) {
        assessment.raise(RiskLevel::High, "Internal IP address attempt");
    }

    if let Some(port) = port.filter(|port| policy.is_port_blocked(*port)) {
        assessment.raise(RiskLevel::High, format!("Sensitive port {}", port));
    }

    let lowered = raw.to_lowercase();

    if lowered.contains("metadata") {
        assessment.raise(RiskLevel::High, "Potential metadata endpoint access");
    }

    if SUSPICIOUS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        assessment.raise(RiskLevel::Medium, "Suspicious keywords detected");
    }

    assessment
}
