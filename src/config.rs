//! Application configuration
//!
//! Resolution order: built-in defaults, then a JSON file (explicit path or
//! `mango.json` next to the executable), then environment variables. CLI
//! flags are applied last by the binary.

use crate::error::{MangoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "mango.json";

/// Environment variable overriding the endpoint URL
pub const URL_ENV: &str = "MANGO_ENDPOINT_URL";
/// Environment variable carrying the full-text API key
pub const API_KEY_ENV: &str = "MANGO_API_KEY";

/// Which kind of trial service to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Companion backend: `?input=<query>`
    #[default]
    Backend,
    /// Paginated full-text registry: `?size=N&from=0&_fulltext=<query>`
    Fulltext,
    /// clinicaltrials.gov v2 studies API, queried directly
    Registry,
}

impl EndpointKind {
    pub fn default_url(self) -> &'static str {
        match self {
            EndpointKind::Backend => "http://127.0.0.1:8000/api/search-studies",
            EndpointKind::Fulltext => "https://clinicaltrialsapi.cancer.gov/api/v2/trials",
            EndpointKind::Registry => "https://clinicaltrials.gov/api/v2/studies",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service variant
    pub endpoint: EndpointKind,
    /// Endpoint URL; the variant's default when unset
    pub url: Option<String>,
    /// Page size for the full-text variant
    pub page_size: usize,
    /// Page cap when following registry continuation tokens
    pub max_pages: usize,
    /// Recruitment statuses requested from the registry
    pub statuses: Vec<String>,
    /// Sent as `X-API-KEY` when present
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointKind::Backend,
            url: None,
            page_size: 10,
            max_pages: 5,
            statuses: vec!["AVAILABLE".to_string(), "RECRUITING".to_string()],
            api_key: None,
            timeout_secs: 30,
            user_agent: format!("Mango/{} (clinical trial finder)", crate::VERSION),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location if it exists.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let text =
            std::fs::read_to_string(path).map_err(|e| MangoError::ConfigRead(display.clone(), e))?;
        serde_json::from_str(&text).map_err(|e| MangoError::ConfigParse(display, e))
    }

    /// Apply environment overrides through `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.url = Some(url);
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Effective endpoint URL
    pub fn endpoint_url(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or_else(|| self.endpoint.default_url())
    }
}

/// `mango.json` next to the executable
pub fn default_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.join(CONFIG_FILENAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_target_the_backend() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint, EndpointKind::Backend);
        assert_eq!(
            config.endpoint_url(),
            "http://127.0.0.1:8000/api/search-studies"
        );
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "endpoint": "registry", "max_pages": 2 }}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, EndpointKind::Registry);
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.endpoint_url(), "https://clinicaltrials.gov/api/v2/studies");
    }

    #[test]
    fn bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, MangoError::ConfigParse(..)));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn env_overrides_url_and_key() {
        let config = AppConfig::default().with_env(|key| match key {
            URL_ENV => Some("http://localhost:9000/search".to_string()),
            API_KEY_ENV => Some("secret".to_string()),
            _ => None,
        });
        assert_eq!(config.endpoint_url(), "http://localhost:9000/search");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = AppConfig::default().with_env(|_| Some(String::new()));
        assert_eq!(config, AppConfig::default());
    }
}
