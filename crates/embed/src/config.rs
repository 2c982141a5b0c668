use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Runtime configuration for [`HttpEmbedder`](crate::HttpEmbedder).
///
/// # Example
/// ```
/// use embed::{EmbedConfig, HttpEmbedder};
///
/// let cfg = EmbedConfig {
///     api_url: Some("https://api.openai.com/v1/embeddings".into()),
///     api_auth_header: Some("Bearer sk-xxx".into()),
///     api_provider: Some("openai".into()),
///     model_name: "text-embedding-3-small".into(),
///     ..Default::default()
/// };
///
/// let embedder = HttpEmbedder::new(cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedConfig {
    /// Embedding endpoint.
    pub api_url: Option<String>,
    /// Value for the `Authorization` header (e.g. `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Provider hint: `"hf"`, `"openai"`, or anything else for the custom shape.
    pub api_provider: Option<String>,
    /// Model label, sent to providers that take one in the request body.
    pub model_name: String,
    /// Overall request timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Extra headers attached to every embedding request.
    pub headers: BTreeMap<String, String>,
    /// L2-normalize returned vectors.
    pub normalize: bool,
    /// Backoff policy; defaults apply when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    /// Retry transient failures.
    pub enable_retry: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            model_name: "bge-small-en-v1.5".into(),
            api_timeout_secs: Some(30),
            headers: BTreeMap::new(),
            normalize: false,
            retry_config: None,
            enable_retry: true,
        }
    }
}

impl EmbedConfig {
    /// Provider name in lowercase, `"custom"` when unset.
    pub fn provider_name(&self) -> String {
        self.api_provider
            .as_deref()
            .unwrap_or("custom")
            .to_ascii_lowercase()
    }
}
