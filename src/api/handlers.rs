// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::gate::{AttemptRecord, FetchMediator, FetchResult, RawRequest, RiskAssessment};

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchOutcome {
    Success {
        url: String,
        response: String,
        status_code: u16,
        bytes: usize,
        elapsed_ms: u64,
        truncated: bool,
    },
    Error {
        url: String,
        message: String,
        reason: &'static str,
        risk_analysis: RiskAssessment,
    },
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    #[serde(flatten)]
    pub outcome: FetchOutcome,
    /// Attempt log snapshot taken after this request was recorded
    pub log: Vec<AttemptRecord>,
}

pub struct ApiHandlers {
    mediator: Arc<FetchMediator>,
}

impl ApiHandlers {
    pub fn new(mediator: Arc<FetchMediator>) -> Self {
        Self { mediator }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub async fn fetch(&self, request: RawRequest) -> (StatusCode, Json<FetchResponse>) {
        info!(url = %request.url, client = ?request.client_addr, "Fetch request received");

        let result = self.mediator.mediate(&request).await;
        let url = request.url;

        let (status, outcome) = match result {
            FetchResult::Succeeded { status, body, body_size, truncated, elapsed } => (
                StatusCode::OK,
                FetchOutcome::Success {
                    url,
                    response: body,
                    status_code: status,
                    bytes: body_size,
                    elapsed_ms: elapsed.as_millis() as u64,
                    truncated,
                },
            ),
            FetchResult::Blocked { reason, risk } => (
                StatusCode::FORBIDDEN,
                FetchOutcome::Error {
                    url,
                    message: reason.describe().to_string(),
                    reason: reason.as_str(),
                    risk_analysis: risk,
                },
            ),
            FetchResult::FetchFailed { error, risk } => (
                StatusCode::BAD_REQUEST,
                FetchOutcome::Error {
                    url,
                    reason: error.kind.as_str(),
                    message: error.message,
                    risk_analysis: risk,
                },
            ),
        };

        let log = self.mediator.attempts().recent();
        (status, Json(FetchResponse { outcome, log }))
    }

    pub async fn list_attempts(&self) -> Json<ApiResponse<Vec<AttemptRecord>>> {
        Json(ApiResponse::success(self.mediator.attempts().recent()))
    }
}
