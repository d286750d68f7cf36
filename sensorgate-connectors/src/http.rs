//! HTTP Catalog Source - Upstream Registry REST API
//!
//! ## Overview
//!
//! Fetches a complete catalog with one `GET` against the registry. The
//! request is blocking: the reference cache already runs loads on a helper
//! thread when a load timeout is configured, and holds its reload gate for
//! the duration either way.
//!
//! ## Retries
//!
//! Transport failures, `429` and `5xx` are retried with exponential backoff:
//!
//! ```text
//! delay(attempt) = min(retry_backoff * 2^(attempt - 1), max_backoff)
//! ```
//!
//! Other statuses and decode failures are returned immediately. Retries
//! happen inside a single load, so the cache sees one load per reload
//! however many attempts it took.
//!
//! ## Authentication
//!
//! - Bearer token (`Authorization: Bearer ...`)
//! - Basic (`Authorization: Basic base64(user:pass)`)
//! - API key in a caller-chosen header
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sensorgate_connectors::http::{HttpCatalogSource, HttpConfig};
//! use sensorgate_schemas::SourceRecord;
//!
//! let config = HttpConfig::new("https://registry.example.com")
//!     .api_key("X-Api-Key", "secret")
//!     .max_retries(2);
//! let sources = HttpCatalogSource::<SourceRecord>::new(config, "/api/v1/sources")?;
//!
//! for source in sources.fetch()? {
//!     println!("{} -> {}", source.id, source.source_type_id);
//! }
//! # Ok::<(), sensorgate_connectors::ConnectorError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sensorgate_core::{CatalogLoader, LoadError};

use crate::{envelope, ConnectorError};

/// HTTP configuration
#[derive(Clone)]
pub struct HttpConfig {
    /// Base URL of the registry API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub retry_backoff: Duration,
    /// Upper bound on any single retry delay
    pub max_backoff: Duration,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Clone)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
    /// Basic authentication
    Basic { username: String, password: String },
    /// API key in header
    ApiKey { header: String, value: String },
}

// Credentials never reach log output
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::None => f.write_str("None"),
            AuthMethod::Bearer(_) => f.write_str("Bearer(***)"),
            AuthMethod::Basic { username, .. } => write!(f, "Basic({}:***)", username),
            AuthMethod::ApiKey { header, .. } => write!(f, "ApiKey({}: ***)", header),
        }
    }
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("auth", &self.auth)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            auth: AuthMethod::None,
            headers: HashMap::new(),
            max_retries: 3,
            retry_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            user_agent: format!("SensorGate/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial retry delay and its cap
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.retry_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Request counters for one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// HTTP requests sent, retries included
    pub requests: u64,
    /// Requests that were retried
    pub retries: u64,
    /// Fetches that returned an error
    pub failures: u64,
    /// Response bytes received
    pub bytes_received: u64,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    bytes_received: AtomicU64,
}

/// Catalog served by the registry at `base_url + path`
pub struct HttpCatalogSource<V> {
    config: HttpConfig,
    url: String,
    agent: ureq::Agent,
    counters: Counters,
    _record: PhantomData<fn() -> V>,
}

impl<V: DeserializeOwned> HttpCatalogSource<V> {
    /// Create a source for the catalog at `path`
    pub fn new(config: HttpConfig, path: &str) -> Result<Self, ConnectorError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ConnectorError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }
        if config.timeout.is_zero() {
            return Err(ConnectorError::Config("timeout must be positive".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        let url = format!("{}{}", config.base_url.trim_end_matches('/'), path);

        Ok(Self {
            config,
            url,
            agent,
            counters: Counters::default(),
            _record: PhantomData,
        })
    }

    /// Full catalog URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Request counters since construction
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes_received.load(Ordering::Relaxed),
        }
    }

    /// Fetch and decode the whole catalog, retrying transient failures
    pub fn fetch(&self) -> Result<Vec<V>, ConnectorError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once() {
                Ok(records) => return Ok(records),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.backoff_delay(attempt);
                    log::debug!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        self.url,
                        e,
                        attempt,
                        self.config.max_retries,
                        delay
                    );
                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(delay);
                }
                Err(e) => {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    return Err(e);
                }
            }
        }
    }

    fn fetch_once(&self) -> Result<Vec<V>, ConnectorError> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        match self.build_request().call() {
            Ok(response) => {
                let text = response
                    .into_string()
                    .map_err(|e| ConnectorError::Request(e.to_string()))?;
                self.counters
                    .bytes_received
                    .fetch_add(text.len() as u64, Ordering::Relaxed);
                envelope::decode_catalog(&self.url, &text)
            }
            Err(ureq::Error::Status(status, response)) => Err(ConnectorError::ServerError {
                status,
                message: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(ConnectorError::Request(e.to_string())),
        }
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self.agent.get(&self.url);

        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
            AuthMethod::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                request = request.set("Authorization", &format!("Basic {}", credentials));
            }
            AuthMethod::ApiKey { header, value } => {
                request = request.set(header, value);
            }
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request.set("Accept", "application/json")
    }
}

impl<V: DeserializeOwned> CatalogLoader<V> for HttpCatalogSource<V> {
    fn load(&self) -> Result<Vec<V>, LoadError> {
        self.fetch().map_err(LoadError::from)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

impl<V> fmt::Debug for HttpCatalogSource<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCatalogSource")
            .field("url", &self.url)
            .field("config", &self.config)
            .finish()
    }
}
