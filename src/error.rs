//! Error types for Mango
//!
//! `SearchError` describes why a single trial search failed and is kept in
//! the search state as a first-class value. `MangoError` covers everything
//! the binary can fail on.

use thiserror::Error;

/// Which of the three failure classes a search fell into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    Transport,
    Status,
    Payload,
}

/// Failure of one search request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The request never reached the server, or timed out
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Server error: {code}")]
    Status { code: u16, body: String },

    /// The body was not a trial list
    #[error("Malformed response: {0}")]
    Payload(String),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::Transport(_) => SearchErrorKind::Transport,
            SearchError::Status { .. } => SearchErrorKind::Status,
            SearchError::Payload(_) => SearchErrorKind::Payload,
        }
    }

    /// Short text suitable for a one-line status bar
    pub fn summary(&self) -> String {
        match self {
            SearchError::Transport(_) => "Could not reach the trial service".to_string(),
            SearchError::Status { code, .. } => format!("Trial service answered {}", code),
            SearchError::Payload(_) => "Trial service sent an unreadable response".to_string(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Payload(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Payload(err.to_string())
    }
}

/// Main error type for Mango
#[derive(Error, Debug)]
pub enum MangoError {
    #[error("Failed to read config '{0}': {1}")]
    ConfigRead(String, std::io::Error),

    #[error("Invalid config '{0}': {1}")]
    ConfigParse(String, serde_json::Error),

    #[error("Invalid endpoint URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Search timed out after {0}s")]
    Timeout(u64),

    #[error("Nothing to search for: the query is empty")]
    EmptyQuery,

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Mango operations
pub type Result<T> = std::result::Result<T, MangoError>;
