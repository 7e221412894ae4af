//! Transports exposing [`SearchService`](crate::service::SearchService):
//! MCP over stdio or streamable HTTP, the newline-delimited envelope
//! protocol on stdio, and a plain JSON HTTP endpoint.

pub mod contract;
pub mod http;
pub mod mcp;
pub mod stdio;
