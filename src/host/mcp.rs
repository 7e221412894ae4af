//! MCP server exposing the search operation as the `websearch` tool.
//!
//! The same [`WebsearchMcp`] handler backs the stdio transport and the
//! streamable HTTP endpoint mounted by the HTTP host.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::HostError;
use crate::service::{SearchInput, SearchService};

/// Name reported to MCP clients during initialisation.
pub const SERVER_NAME: &str = "websearch";

/// MCP handler wrapping a shared [`SearchService`].
#[derive(Clone)]
pub struct WebsearchMcp {
    tool_router: ToolRouter<Self>,
    service: Arc<SearchService>,
}

#[tool_router]
impl WebsearchMcp {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    #[tool(description = "Search the web using SearxNG. Set summary to true to attach an \
                          LLM summary of each result page.")]
    async fn websearch(
        &self,
        Parameters(input): Parameters<SearchInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("tool_call", tool = "websearch", %request_id);
        async move {
            match self.service.handle(input).await {
                Ok(results) => {
                    let json = serde_json::to_string(&results).map_err(|e| {
                        McpError::internal_error(format!("failed to encode results: {e}"), None)
                    })?;
                    Ok(CallToolResult::success(vec![Content::text(json)]))
                }
                Err(e) => {
                    tracing::warn!(error = %e, input_error = e.is_input(), "tool call failed");
                    Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[tool_handler]
impl ServerHandler for WebsearchMcp {
    fn get_info(&self) -> ServerInfo {
        let summaries = if self.service.summaries_available() {
            "Page summaries are available with summary=true."
        } else {
            "Page summaries are not configured; results carry snippets only."
        };
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
            instructions: Some(format!("Web search over SearxNG. {summaries}")),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serve MCP on stdin/stdout until the client disconnects or `shutdown`
/// fires.
///
/// # Errors
///
/// Returns an error if the initialise handshake fails or the service task
/// panics.
pub async fn run_mcp_stdio(service: Arc<SearchService>, shutdown: CancellationToken) -> crate::error::Result<()> {
    let running = WebsearchMcp::new(service)
        .serve(stdio())
        .await
        .map_err(|e| HostError::Protocol(format!("MCP initialisation failed: {e}")))?;

    let session = running.cancellation_token();
    let watcher = tokio::spawn(async move {
        shutdown.cancelled().await;
        tracing::info!("shutdown requested; stopping MCP stdio host");
        session.cancel();
    });

    let quit = running.waiting().await;
    watcher.abort();
    let reason = quit.map_err(|e| HostError::Protocol(format!("MCP service task failed: {e}")))?;
    tracing::info!(?reason, "MCP stdio host stopped");
    Ok(())
}

/// Streamable HTTP transport for [`WebsearchMcp`], one handler per session.
pub fn streamable_http_service(
    service: Arc<SearchService>,
) -> StreamableHttpService<WebsearchMcp, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(WebsearchMcp::new(Arc::clone(&service))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    )
}
