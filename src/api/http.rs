// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::handlers::{ApiHandlers, ApiResponse, FetchRequest, FetchResponse};
use crate::gate::{AttemptRecord, FetchMediator, RawRequest};

pub struct HttpServer {
    handlers: Arc<ApiHandlers>,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(mediator: Arc<FetchMediator>, addr: SocketAddr) -> Self {
        Self {
            handlers: Arc::new(ApiHandlers::new(mediator)),
            addr,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(ApiHandlers::health))
            .route("/fetch-data", post(fetch_form_handler))
            .route("/api/fetch", post(fetch_json_handler))
            .route("/api/attempts", get(list_attempts_handler))
            .with_state(self.handlers.clone())
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_on(listener).await
    }

    pub async fn serve_on(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = self.router();

        info!(addr = %listener.local_addr()?, "Starting HTTP server");

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

        Ok(())
    }
}

fn raw_request(url: String, client_addr: SocketAddr, headers: &HeaderMap) -> RawRequest {
    let mut request = RawRequest::new(url);
    request.client_addr = Some(client_addr);
    request.user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    request
}

async fn fetch_form_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(request): Form<FetchRequest>,
) -> (StatusCode, Json<FetchResponse>) {
    handlers.fetch(raw_request(request.url, client_addr, &headers)).await
}

async fn fetch_json_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<FetchRequest>,
) -> (StatusCode, Json<FetchResponse>) {
    handlers.fetch(raw_request(request.url, client_addr, &headers)).await
}

async fn list_attempts_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Json<ApiResponse<Vec<AttemptRecord>>> {
    handlers.list_attempts().await
}
