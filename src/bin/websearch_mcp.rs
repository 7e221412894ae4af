//! `websearch-mcp`: MCP web search server binary.
//!
//! Speaks MCP on stdio by default; `--envelope` swaps in the
//! newline-delimited envelope protocol and `--http` serves HTTP instead. In
//! stdio mode stdout carries the protocol, so all tracing output goes to
//! stderr. In HTTP mode logs go to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use websearch_mcp::host::http::HttpHost;
use websearch_mcp::host::mcp::run_mcp_stdio;
use websearch_mcp::host::stdio::run_stdio_bridge;
use websearch_mcp::{HostConfig, Overrides, SearchService};

/// Web search over SearxNG with optional LLM page summaries.
#[derive(Debug, Parser)]
#[command(name = "websearch-mcp", version, about)]
struct Cli {
    /// Base URL of the SearxNG instance.
    #[arg(long, env = "SEARXNG_URL")]
    searxng_url: Option<String>,

    /// Serve HTTP (MCP at /mcp, JSON at /search) instead of stdio.
    #[arg(long)]
    http: bool,

    /// On stdio, speak newline-delimited command envelopes instead of MCP.
    #[arg(long, conflicts_with = "http")]
    envelope: bool,

    /// Port for HTTP mode.
    #[arg(long)]
    port: Option<u16>,

    /// Log at debug level, including per-call timing.
    #[arg(long)]
    debug: bool,

    /// TOML config file. Command-line values override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API used for summaries.
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// API key for the summary backend.
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Model used for summaries.
    #[arg(long, env = "LLM_MODEL")]
    llm_model: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            searxng_url: self.searxng_url.clone(),
            http: self.http,
            envelope: self.envelope,
            port: self.port,
            llm_base_url: self.llm_base_url.clone(),
            llm_api_key: self.llm_api_key.clone(),
            llm_model: self.llm_model.clone(),
        }
    }
}

fn init_tracing(debug: bool, http: bool) {
    let default_filter = if debug {
        "websearch=debug,websearch_mcp=debug"
    } else {
        "websearch=info,websearch_mcp=info"
    };
    let writer = if http {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = HostConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides());
    init_tracing(cli.debug, config.server.http);
    config.validate()?;

    tracing::info!(
        searxng = %config.search.base_url,
        http = config.server.http,
        envelope = config.server.envelope,
        "websearch-mcp starting"
    );

    let service = Arc::new(SearchService::from_config(&config)?);
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; shutting down");
            signal.cancel();
        }
    });

    if config.server.http {
        let mut host =
            HttpHost::start(service, &config.server.host, config.server.port, shutdown).await?;
        host.wait().await?;
    } else if config.server.envelope {
        run_stdio_bridge(service, shutdown).await.map_err(|e| {
            tracing::error!(error = %e, "stdio host exited with error");
            anyhow::anyhow!("stdio host failed: {e}")
        })?;
    } else {
        run_mcp_stdio(service, shutdown).await.map_err(|e| {
            tracing::error!(error = %e, "MCP stdio host exited with error");
            anyhow::anyhow!("MCP stdio host failed: {e}")
        })?;
    }

    tracing::info!("websearch-mcp shut down cleanly");
    Ok(())
}
