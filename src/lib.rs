//! Web search tool host.
//!
//! Serves a single `websearch` tool backed by a SearxNG instance, with
//! optional LLM summaries of each result page. MCP is spoken on stdio by
//! default and at `/mcp` in HTTP mode.

pub mod config;
pub mod error;
pub mod host;
pub mod service;

pub use config::{HostConfig, Overrides};
pub use error::{HostError, Result, ToolError};
pub use service::{SearchInput, SearchService};
