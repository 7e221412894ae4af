//! Host configuration loaded from an optional TOML file.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes. Command-line values are applied on top with
//! [`HostConfig::apply_overrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use websearch::{EnrichConfig, SearchConfig, SummarizerConfig};

use crate::error::{HostError, Result};

/// Default port for the HTTP host.
pub const DEFAULT_PORT: u16 = 8080;

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Search backend settings.
    pub search: SearchConfig,
    /// Page fetch and summary fan-out settings.
    pub enrich: EnrichConfig,
    /// Summarisation backend. Summaries are unavailable unless both
    /// `base_url` and `model` are set.
    pub llm: LlmConfig,
    /// Transport selection.
    pub server: ServerConfig,
}

/// Completion backend used for page summaries.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

/// How the host is exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Serve HTTP instead of MCP on stdio.
    pub http: bool,
    /// On stdio, speak the newline-delimited envelope protocol instead of MCP.
    pub envelope: bool,
    /// Bind address for the HTTP host.
    pub host: String,
    /// Port for the HTTP host.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http: false,
            envelope: false,
            host: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Values supplied on the command line or through the environment.
///
/// `None` leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub searxng_url: Option<String>,
    pub http: bool,
    pub envelope: bool,
    pub port: Option<u16>,
    pub llm_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
}

impl HostConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HostError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `explicit` if given, else the default config file if it exists,
    /// else built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing or either file is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading default config file");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply command-line values on top of the loaded file.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.searxng_url {
            self.search.base_url = url;
        }
        if overrides.http {
            self.server.http = true;
        }
        if overrides.envelope {
            self.server.envelope = true;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if overrides.llm_base_url.is_some() {
            self.llm.base_url = overrides.llm_base_url;
        }
        if overrides.llm_api_key.is_some() {
            self.llm.api_key = overrides.llm_api_key;
        }
        if overrides.llm_model.is_some() {
            self.llm.model = overrides.llm_model;
        }
    }

    /// Check the search and enrichment sections.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.search.base_url.trim().is_empty() {
            return Err(HostError::Config(
                "SearxNG URL is required (--searxng-url, SEARXNG_URL, or [search].base_url)".into(),
            ));
        }
        self.search
            .validate()
            .map_err(|e| HostError::Config(e.to_string()))?;
        self.enrich
            .validate()
            .map_err(|e| HostError::Config(e.to_string()))?;
        Ok(())
    }

    /// Summariser settings, present only when a base URL and model are set.
    pub fn summarizer_config(&self) -> Option<SummarizerConfig> {
        let base_url = self.llm.base_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let model = self.llm.model.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let config = SummarizerConfig::new(base_url, model);
        Some(match self.llm.api_key.as_deref() {
            Some(key) if !key.is_empty() => config.with_api_key(key),
            _ => config,
        })
    }
}

/// `<config dir>/websearch-mcp/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("websearch-mcp").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        (dir, path)
    }

    #[test]
    fn defaults() {
        let config = HostConfig::default();
        assert!(!config.server.http);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.enrich.concurrency, 8);
        assert!(config.summarizer_config().is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let (_dir, path) = write_config(
            r#"
[search]
base_url = "http://searx.local:8888"

[enrich]
concurrency = 3
"#,
        );
        let config = HostConfig::from_file(&path).expect("load");
        assert_eq!(config.search.base_url, "http://searx.local:8888");
        assert_eq!(config.search.max_pages, 50);
        assert_eq!(config.enrich.concurrency, 3);
        assert_eq!(config.enrich.fetch_timeout_ms, 5_000);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let (_dir, path) = write_config("this is not valid toml {{{");
        let err = HostConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, HostError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let err = HostConfig::load(Some(Path::new("/nonexistent/websearch.toml"))).unwrap_err();
        assert!(matches!(err, HostError::Io(_)));
    }

    #[test]
    fn overrides_win_over_file() {
        let (_dir, path) = write_config(
            r#"
[search]
base_url = "http://from-file:8888"

[llm]
base_url = "http://llm-from-file/v1"
model = "file-model"

[server]
port = 9000
"#,
        );
        let mut config = HostConfig::from_file(&path).expect("load");
        config.apply_overrides(Overrides {
            searxng_url: Some("http://from-cli:8888".into()),
            http: true,
            envelope: false,
            port: None,
            llm_base_url: None,
            llm_api_key: Some("sk-cli".into()),
            llm_model: Some("cli-model".into()),
        });
        assert_eq!(config.search.base_url, "http://from-cli:8888");
        assert!(config.server.http);
        assert_eq!(config.server.port, 9000);

        let summarizer = config.summarizer_config().expect("summarizer configured");
        assert_eq!(summarizer.base_url, "http://llm-from-file/v1");
        assert_eq!(summarizer.model, "cli-model");
        assert_eq!(summarizer.api_key, "sk-cli");
    }

    #[test]
    fn summarizer_needs_base_url_and_model() {
        let mut config = HostConfig::default();
        config.llm.base_url = Some("http://llm/v1".into());
        assert!(config.summarizer_config().is_none());
        config.llm.model = Some("  ".into());
        assert!(config.summarizer_config().is_none());
        config.llm.model = Some("m".into());
        let summarizer = config.summarizer_config().expect("configured");
        assert!(summarizer.api_key.is_empty());
    }

    #[test]
    fn validate_requires_searxng_url() {
        let err = HostConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("SearxNG URL is required"));

        let mut config = HostConfig::default();
        config.search.base_url = "ftp://searx".into();
        assert!(config.validate().is_err());

        config.search.base_url = "http://searx:8888".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_hides_api_key() {
        let llm = LlmConfig {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        assert!(!format!("{llm:?}").contains("sk-secret"));
    }
}
