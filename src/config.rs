//! YAML configuration file support for vecstore
//!
//! One file describes how to reach the vector-store service and, optionally,
//! which embedding capability collections should use for documents that arrive
//! without vectors.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "local dev"
//!
//! client:
//!   base_url: "http://localhost:8000"
//!   api_key: "secret"
//!   api_key_header: "x-api-key"
//!   headers:
//!     x-tenant: "acme"
//!   timeout_secs: 30
//!
//! embedding:
//!   mode: "api"
//!   api_url: "https://api.openai.com/v1/embeddings"
//!   api_auth_header: "Bearer sk-xxx"
//!   api_provider: "openai"
//!   model_name: "text-embedding-3-small"
//!   normalize: true
//! ```
//!
//! `mode: "stub"` with a `dim` swaps in the deterministic offline embedder.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use client::{ClientConfig, ClientError, VectorStoreClient};
use embed::{EmbedConfig, EmbedError, EmbeddingFunction, HttpEmbedder, RetryConfig, StubEmbedder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("failed to build client: {0}")]
    Client(#[from] ClientError),

    #[error("failed to build embedder: {0}")]
    Embed(#[from] EmbedError),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VecstoreConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Connection to the vector-store service
    #[serde(default)]
    pub client: ClientConfig,

    /// Embedding capability handed to collections; `None` means callers must
    /// always supply vectors.
    #[serde(default)]
    pub embedding: Option<EmbeddingYamlConfig>,
}

impl VecstoreConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VecstoreConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        let base_url = &self.client.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigLoadError::Validation(format!(
                "client.base_url must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "client.timeout_secs must be >= 1".to_string(),
            ));
        }
        self.client
            .header_map()
            .map_err(|e| ConfigLoadError::Validation(format!("client.headers: {e}")))?;

        if let Some(embedding) = &self.embedding {
            embedding.validate()?;
        }
        Ok(())
    }

    /// Client for the configured service.
    pub fn build_client(&self) -> Result<VectorStoreClient, ConfigLoadError> {
        Ok(VectorStoreClient::new(self.client.clone())?)
    }

    /// Embedding capability for new collection handles, if one is configured.
    pub fn build_embedder(&self) -> Result<Option<Arc<dyn EmbeddingFunction>>, ConfigLoadError> {
        let Some(embedding) = &self.embedding else {
            return Ok(None);
        };
        let embedder: Arc<dyn EmbeddingFunction> = match embedding.mode {
            EmbeddingMode::Stub => Arc::new(StubEmbedder::new(embedding.dim)),
            EmbeddingMode::Api => Arc::new(HttpEmbedder::new(embedding.to_embed_config())?),
        };
        info!(
            mode = ?embedding.mode,
            model = %embedding.model_name,
            "vecstore_embedder_ready"
        );
        Ok(Some(embedder))
    }
}

impl Default for VecstoreConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            client: ClientConfig::default(),
            embedding: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Remote provider over HTTP.
    Api,
    /// Deterministic hash-derived vectors.
    Stub,
}

/// Embedding YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingYamlConfig {
    pub mode: EmbeddingMode,

    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub api_auth_header: Option<String>,

    #[serde(default)]
    pub api_provider: Option<String>,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default = "default_timeout")]
    pub api_timeout_secs: Option<u64>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub normalize: bool,

    #[serde(default)]
    pub retry: Option<RetryConfig>,

    #[serde(default = "true_value")]
    pub enable_retry: bool,

    /// Vector width for `mode: stub`.
    #[serde(default = "default_dim")]
    pub dim: usize,
}

impl EmbeddingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.mode {
            EmbeddingMode::Api if self.api_url.is_none() => Err(ConfigLoadError::Validation(
                "embedding.api_url is required when mode is 'api'".to_string(),
            )),
            EmbeddingMode::Stub if self.dim == 0 => Err(ConfigLoadError::Validation(
                "embedding.dim must be >= 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn to_embed_config(&self) -> EmbedConfig {
        EmbedConfig {
            api_url: self.api_url.clone(),
            api_auth_header: self.api_auth_header.clone(),
            api_provider: self.api_provider.clone(),
            model_name: self.model_name.clone(),
            api_timeout_secs: self.api_timeout_secs,
            headers: self.headers.clone(),
            normalize: self.normalize,
            retry_config: self.retry,
            enable_retry: self.enable_retry,
        }
    }
}

fn default_model_name() -> String {
    "bge-small-en-v1.5".to_string()
}
fn default_timeout() -> Option<u64> {
    Some(30)
}
fn true_value() -> bool {
    true
}
fn default_dim() -> usize {
    384
}
