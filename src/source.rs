//! Trial sources
//!
//! A `TrialSource` turns a query into trials. `HttpTrialSource` talks to one
//! of the three supported services; tests substitute in-process fakes.

use crate::config::{AppConfig, EndpointKind};
use crate::error::{MangoError, SearchError};
use crate::trial::Trial;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Keys under which an object response may carry its trial list
const LIST_KEYS: &[&str] = &["studies", "data", "trials", "results"];

/// Anything that can answer a trial search. Called from a worker thread.
pub trait TrialSource: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Trial>, SearchError>;
}

/// One page of a response
#[derive(Debug, Default)]
pub struct Page {
    pub trials: Vec<Trial>,
    pub next_page_token: Option<String>,
}

/// Parse a response body into trials, keeping the service's order
pub fn parse_trials(body: &str) -> Result<Vec<Trial>, SearchError> {
    parse_page(body).map(|page| page.trials)
}

/// Parse a response body, including the registry continuation token if any
pub fn parse_page(body: &str) -> Result<Page, SearchError> {
    let value: Value = serde_json::from_str(body)?;
    let (list, next_page_token) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut map) => {
            let token = map
                .get("nextPageToken")
                .and_then(Value::as_str)
                .map(str::to_string);
            let list = LIST_KEYS
                .iter()
                .find_map(|key| map.remove(*key).filter(Value::is_array))
                .ok_or_else(|| SearchError::Payload("no trial list in response".to_string()))?;
            (list, token)
        }
        other => {
            return Err(SearchError::Payload(format!(
                "expected an array or object, got {}",
                json_type(&other)
            )))
        }
    };

    Ok(Page {
        trials: serde_json::from_value(list)?,
        next_page_token,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP-backed source for the configured service
pub struct HttpTrialSource {
    client: Client,
    kind: EndpointKind,
    base: Url,
    page_size: usize,
    max_pages: usize,
    statuses: Vec<String>,
    api_key: Option<String>,
}

impl HttpTrialSource {
    pub fn new(config: &AppConfig) -> crate::Result<Self> {
        let url = config.endpoint_url();
        let base = Url::parse(url).map_err(|e| MangoError::InvalidUrl(url.to_string(), e))?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MangoError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            kind: config.endpoint,
            base,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            statuses: config.statuses.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Build the request URL for `query`
    pub fn request_url(&self, query: &str, page_token: Option<&str>) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            match self.kind {
                EndpointKind::Backend => {
                    pairs.append_pair("input", query);
                }
                EndpointKind::Fulltext => {
                    pairs
                        .append_pair("size", &self.page_size.to_string())
                        .append_pair("from", "0")
                        .append_pair("_fulltext", query);
                }
                EndpointKind::Registry => {
                    pairs.append_pair("query.cond", query);
                    if !self.statuses.is_empty() {
                        pairs.append_pair("filter.overallStatus", &self.statuses.join("|"));
                    }
                    if let Some(token) = page_token {
                        pairs.append_pair("pageToken", token);
                    }
                }
            }
        }
        url
    }

    fn fetch_page(&self, url: Url) -> Result<Page, SearchError> {
        debug!(%url, "requesting trials");
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SearchError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        parse_page(&body)
    }
}

impl TrialSource for HttpTrialSource {
    fn search(&self, query: &str) -> Result<Vec<Trial>, SearchError> {
        if self.kind != EndpointKind::Registry {
            return self.fetch_page(self.request_url(query, None)).map(|p| p.trials);
        }

        let mut trials = Vec::new();
        let mut token: Option<String> = None;
        for _ in 0..self.max_pages {
            let page = self.fetch_page(self.request_url(query, token.as_deref()))?;
            trials.extend(page.trials);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(trials)
    }
}
