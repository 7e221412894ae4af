//! Error types for the search tool host.

use websearch::SearchError;

/// Failure of a single search tool call.
///
/// Rendered to the caller as the error text of a response.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The caller's input was rejected before any network activity.
    #[error("{0}")]
    Input(String),

    /// The search backend failed before producing any result.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

impl ToolError {
    /// True when the caller can fix the failure by changing its input.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

/// Errors that stop a host from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration file or command-line error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error on the protocol stream or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The HTTP listener failed.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostError>;
