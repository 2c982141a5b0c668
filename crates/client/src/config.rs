use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection settings captured once when the client is built.
///
/// Every request the client (and every collection handle it returns) sends
/// carries `headers` plus, when set, `api_key` under `api_key_header`.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    /// Service origin, e.g. `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the REST API.
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// API key attached to every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header that carries [`api_key`](Self::api_key).
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Static headers attached to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Overall request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_path: default_api_path(),
            api_key: None,
            api_key_header: default_api_key_header(),
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_path", &self.api_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load from an optional `vecstore.{toml,yaml,json}` in the working
    /// directory, overridden by `VECSTORE_*` environment variables
    /// (`VECSTORE_BASE_URL`, `VECSTORE_API_KEY`, ...).
    pub fn load() -> ClientResult<Self> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("vecstore").required(false))
            .add_source(
                ::config::Environment::with_prefix("VECSTORE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Request timeout, rounded up to whole seconds so a sub-second value
    /// never collapses to zero. `Duration::ZERO` is rejected when the client
    /// is built.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout
            .as_secs()
            .saturating_add(u64::from(timeout.subsec_nanos() > 0));
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Root URL of the REST API, without a trailing slash.
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    /// The header set attached to every request. The API key is inserted last,
    /// so it wins over a static header of the same name.
    pub fn header_map(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            headers.insert(parse_name(name)?, parse_value(name, value)?);
        }
        if let Some(api_key) = self.api_key.as_deref() {
            let mut value = parse_value(&self.api_key_header, api_key)?;
            value.set_sensitive(true);
            headers.insert(parse_name(&self.api_key_header)?, value);
        }
        Ok(headers)
    }

    pub(crate) fn validate(&self) -> ClientResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got `{}`",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_name(name: &str) -> ClientResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::InvalidHeader(format!("`{name}` is not a valid header name")))
}

fn parse_value(name: &str, value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::InvalidHeader(format!("value for `{name}` is not a valid header value")))
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_path() -> String {
    "/api/v1".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
