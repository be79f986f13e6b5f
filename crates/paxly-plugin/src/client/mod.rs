//! crates.io sparse index client with connection pooling and retry logic

use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{PluginError, PluginResult};

/// Default sparse index location
pub const DEFAULT_INDEX_URL: &str = "https://index.crates.io";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// One published version, one line of an index file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub vers: String,
    #[serde(default)]
    pub deps: Vec<IndexDependency>,
    #[serde(default)]
    pub yanked: bool,
}

/// A dependency edge as recorded in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDependency {
    /// Name used in the dependent's manifest
    pub name: String,
    pub req: String,
    #[serde(default)]
    pub optional: bool,
    /// `normal`, `dev` or `build`; absent means `normal`
    #[serde(default)]
    pub kind: Option<String>,
    /// Real crate name when the dependency is renamed
    #[serde(default)]
    pub package: Option<String>,
}

impl IndexDependency {
    /// Name of the crate actually depended upon
    pub fn crate_name(&self) -> &str {
        self.package.as_deref().unwrap_or(&self.name)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self.kind.as_deref(), None | Some("normal"))
    }
}

/// HTTP client for the crates.io sparse index
#[derive(Debug, Clone)]
pub struct CratesIndexClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base index URL, without trailing slash
    base_url: String,
}

impl CratesIndexClient {
    /// Client for the public crates.io index
    pub fn new() -> PluginResult<Self> {
        Self::with_base_url(DEFAULT_INDEX_URL)
    }

    /// Client for an index served at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> PluginResult<Self> {
        Self::with_config(base_url.into(), RetryConfig::default())
    }

    /// Client with custom retry behaviour
    pub fn with_config(base_url: String, retry_config: RetryConfig) -> PluginResult<Self> {
        url::Url::parse(&base_url)
            .map_err(|e| PluginError::parse("index url", format!("'{}' is not a valid URL: {}", base_url, e)))?;

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("paxly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PluginError::network("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            retry_config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> PluginResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = PluginResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_transient() && attempt < self.retry_config.max_retries => {
                    attempt += 1;
                    debug!("Index request failed (attempt {}): {}", attempt, error);

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis((delay.as_millis() as f64 * self.retry_config.multiplier) as u64),
                        self.retry_config.max_delay,
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Fetch every published version of `name`. Unknown crates yield an empty list.
    pub async fn fetch_entries(&self, name: &str) -> PluginResult<Vec<IndexEntry>> {
        let url = format!("{}/{}", self.base_url, index_path(name));

        let body = self
            .with_retry(|| async {
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| PluginError::network(format!("Failed to fetch {}", url), e))?;

                match response.status() {
                    StatusCode::OK => response
                        .text()
                        .await
                        .map(Some)
                        .map_err(|e| PluginError::network(format!("Failed to read {}", url), e)),
                    StatusCode::NOT_FOUND | StatusCode::GONE => Ok(None),
                    status if status.is_server_error() => Err(PluginError::Network {
                        message: format!("Index returned status {} for {}", status, name),
                        source: None,
                    }),
                    status => Err(PluginError::Lookup {
                        name: name.to_string(),
                        message: format!("index returned status {}", status),
                    }),
                }
            })
            .await?;

        match body {
            Some(body) => parse_index_file(&url, &body),
            None => {
                debug!("Crate '{}' not found in index", name);
                Ok(Vec::new())
            }
        }
    }
}

/// Path of a crate's file inside the index
pub fn index_path(name: &str) -> String {
    let name = name.to_lowercase();
    let chars: Vec<char> = name.chars().collect();
    match chars.len() {
        0 => name,
        1 => format!("1/{}", name),
        2 => format!("2/{}", name),
        3 => format!("3/{}/{}", chars[0], name),
        _ => format!(
            "{}/{}/{}",
            chars[..2].iter().collect::<String>(),
            chars[2..4].iter().collect::<String>(),
            name
        ),
    }
}

/// Parse a newline-delimited JSON index file
pub fn parse_index_file(source: &str, body: &str) -> PluginResult<Vec<IndexEntry>> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|e| PluginError::parse(source, e.to_string())))
        .collect()
}
