//! HTTP host exposing the search operation as a JSON endpoint.
//!
//! `POST /search` takes a [`SearchInput`] body and returns the result array.
//! `GET /health` reports liveness and whether summaries are available.
//! `/mcp` serves the MCP streamable HTTP transport.
//! CORS is fully permissive so browser-based clients can call the host.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use websearch::SearchError;

use crate::error::{HostError, Result, ToolError};
use crate::host::mcp::streamable_http_service;
use crate::service::{SearchInput, SearchService};

/// Error body returned for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Details within an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
    /// Error category (`"invalid_request_error"`, `"backend_error"`, `"server_error"`).
    #[serde(rename = "type")]
    pub error_type: String,
}

#[derive(Clone)]
struct AppState {
    service: Arc<SearchService>,
}

/// Build the router without binding it.
pub fn router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/search", post(handle_search))
        .route("/health", get(handle_health))
        .nest_service("/mcp", streamable_http_service(Arc::clone(&service)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(AppState { service })
}

/// A running HTTP host.
pub struct HttpHost {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    shutdown: CancellationToken,
}

impl HttpHost {
    /// Bind `{host}:{port}` (port `0` picks a free port) and serve in a
    /// background task until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(
        service: Arc<SearchService>,
        host: &str,
        port: u16,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let bind_addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| HostError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| HostError::Server(format!("failed to get local addr: {e}")))?;

        tracing::info!("HTTP host listening on http://{addr}");

        let app = router(service);
        let signal = shutdown.clone().cancelled_owned();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(signal).await {
                tracing::error!("HTTP host error: {e}");
            }
        });

        Ok(Self {
            addr,
            handle,
            shutdown,
        })
    }

    /// Returns the address the host is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the host is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Begin graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the server task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task panicked.
    pub async fn wait(&mut self) -> Result<()> {
        (&mut self.handle)
            .await
            .map_err(|e| HostError::Server(format!("HTTP host task failed: {e}")))
    }
}

impl Drop for HttpHost {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchInput>, JsonRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("search_request", %request_id);
    async move {
        let input = match payload {
            Ok(Json(input)) => input,
            Err(rejection) => {
                tracing::warn!(error = %rejection, "search request body rejected");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_request_error",
                    rejection.body_text(),
                );
            }
        };
        match state.service.handle(input).await {
            Ok(results) => (StatusCode::OK, Json(results)).into_response(),
            Err(e) => {
                let (status, error_type) = classify(&e);
                tracing::warn!(status = status.as_u16(), error = %e, "search request failed");
                error_response(status, error_type, e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: ErrorBody {
            message,
            error_type: error_type.to_owned(),
        },
    };
    (status, Json(body)).into_response()
}

async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "summaries": state.service.summaries_available(),
    }))
}

fn classify(error: &ToolError) -> (StatusCode, &'static str) {
    match error {
        ToolError::Input(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
        ToolError::Search(SearchError::Backend(_)) => (StatusCode::BAD_GATEWAY, "backend_error"),
        ToolError::Search(SearchError::Config(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "server_error")
        }
    }
}
