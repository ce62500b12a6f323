// SPDX-License-Identifier: GPL-3.0-only
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::fetcher::{FetchError, Fetcher};
use crate::gate::attempt_log::{AttemptLog, AttemptOutcome, AttemptRecord};
use crate::gate::policy::Policy;
use crate::gate::risk::{assess, RiskAssessment};
use crate::gate::validator::{validate, RejectReason, Verdict};

/// A fetch request as received from an untrusted caller.
///
/// Caller metadata ends up in the attempt log and nowhere else.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub url: String,
    pub client_addr: Option<SocketAddr>,
    pub user_agent: Option<String>,
}

impl RawRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    fn caller(&self) -> String {
        let addr = self
            .client_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        match &self.user_agent {
            Some(agent) => format!("client {} ({})", addr, agent),
            None => format!("client {}", addr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    HighRisk,
    Rejected(RejectReason),
}

impl BlockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockReason::HighRisk => "high-risk-url",
            BlockReason::Rejected(reason) => reason.as_str(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            BlockReason::HighRisk => "URL looks like an SSRF attempt",
            BlockReason::Rejected(reason) => reason.describe(),
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum FetchResult {
    Blocked {
        reason: BlockReason,
        risk: RiskAssessment,
    },
    Succeeded {
        status: u16,
        body: String,
        body_size: usize,
        truncated: bool,
        elapsed: Duration,
    },
    FetchFailed {
        error: FetchError,
        risk: RiskAssessment,
    },
}

/// Runs every fetch request through the risk check and the validator, and
/// only then through the outbound fetcher.
pub struct FetchMediator {
    policy: Arc<Policy>,
    fetcher: Arc<dyn Fetcher>,
    attempts: Arc<AttemptLog>,
}

impl FetchMediator {
    pub fn new(policy: Arc<Policy>, fetcher: Arc<dyn Fetcher>, attempts: Arc<AttemptLog>) -> Self {
        Self {
            policy,
            fetcher,
            attempts,
        }
    }

    pub fn attempts(&self) -> &Arc<AttemptLog> {
        &self.attempts
    }

    pub async fn mediate(&self, request: &RawRequest) -> FetchResult {
        let url = request.url.as_str();

        let risk = assess(url, &self.policy);
        if risk.is_high() {
            warn!(
                url = %url,
                risk_level = risk.level.as_str(),
                factors = ?risk.factors,
                "Blocked high-risk URL"
            );
            return self.block(request, BlockReason::HighRisk, risk);
        }

        if let Verdict::Rejected(reason) = validate(url, &self.policy) {
            warn!(
                url = %url,
                reason = %reason,
                risk_level = risk.level.as_str(),
                "URL failed validation"
            );
            return self.block(request, BlockReason::Rejected(reason), risk);
        }

        debug!(url = %url, risk_level = risk.level.as_str(), "URL accepted, fetching");

        let started = Instant::now();
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                let elapsed = started.elapsed();
                info!(
                    url = %url,
                    status = page.status,
                    bytes = page.size,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetch completed"
                );
                self.attempts.append(AttemptRecord::new(
                    url,
                    AttemptOutcome::FetchSuccess,
                    format!(
                        "HTTP {}, {} bytes in {} ms, {}",
                        page.status,
                        page.size,
                        elapsed.as_millis(),
                        request.caller()
                    ),
                ));
                FetchResult::Succeeded {
                    status: page.status,
                    body_size: page.size,
                    body: page.body,
                    truncated: page.truncated,
                    elapsed,
                }
            }
            Err(error) => {
                warn!(url = %url, kind = %error.kind, error = %error.message, "Fetch failed");
                self.attempts.append(AttemptRecord::new(
                    url,
                    AttemptOutcome::FetchError,
                    format!("{}, {}", error, request.caller()),
                ));
                FetchResult::FetchFailed { error, risk }
            }
        }
    }

    fn block(
        &self,
        request: &RawRequest,
        reason: BlockReason,
        risk: RiskAssessment,
    ) -> FetchResult {
        let details = if risk.factors.is_empty() {
            format!("{} (risk {}), {}", reason, risk.level.as_str(), request.caller())
        } else {
            format!(
                "{} (risk {}: {}), {}",
                reason,
                risk.level.as_str(),
                risk.factors.join("; "),
                request.caller()
            )
        };
        self.attempts.append(AttemptRecord::new(&request.url, AttemptOutcome::Blocked, details));
        FetchResult::Blocked { reason, risk }
    }
}
