use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use crate::normalize::normalize_l2;
use crate::retry::{with_retry, RetryConfig};
use crate::{EmbedConfig, EmbedError, Embedding, EmbeddingFunction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

/// Embedding provider reached over HTTP.
///
/// One POST per [`generate`](EmbeddingFunction::generate) call, carrying the whole
/// batch. Request and response shapes follow the configured provider.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    cfg: EmbedConfig,
    url: String,
    provider: ApiProviderKind,
    http: reqwest::Client,
}

impl HttpEmbedder {
    /// Builds the embedder; fails when `api_url` is missing or a header is malformed.
    pub fn new(cfg: EmbedConfig) -> Result<Self, EmbedError> {
        let url = cfg.api_url.clone().ok_or_else(|| {
            EmbedError::InvalidConfig("api_url is required for the http embedder".into())
        })?;

        let mut builder = reqwest::Client::builder()
            .default_headers(build_headers(&cfg)?)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32);
        if let Some(secs) = cfg.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| EmbedError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider: api_provider_kind(&cfg),
            url,
            cfg,
            http,
        })
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.cfg
    }

    async fn send(&self, payload: &Value) -> Result<Value, EmbedError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| EmbedError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Status { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmbedError::Response(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl EmbeddingFunction for HttpEmbedder {
    async fn generate(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = build_api_payload(self.provider, texts, &self.cfg.model_name);
        let policy = if self.cfg.enable_retry {
            self.cfg.retry_config.unwrap_or_default()
        } else {
            RetryConfig::disabled()
        };
        let response = with_retry(&policy, || self.send(&payload)).await?;

        let mut vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(EmbedError::Response(format!(
                "provider returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        if self.cfg.normalize {
            for vector in vectors.iter_mut() {
                normalize_l2(vector);
            }
        }

        Ok(vectors)
    }
}

fn build_headers(cfg: &EmbedConfig) -> Result<HeaderMap, EmbedError> {
    let mut headers = HeaderMap::new();
    if let Some(auth) = cfg.api_auth_header.as_deref() {
        let value = HeaderValue::from_str(auth)
            .map_err(|_| EmbedError::InvalidConfig("api_auth_header is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, value);
    }
    for (name, value) in &cfg.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| EmbedError::InvalidConfig(format!("invalid header name `{name}`")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| EmbedError::InvalidConfig(format!("invalid value for header `{name}`")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn api_provider_kind(cfg: &EmbedConfig) -> ApiProviderKind {
    match cfg.provider_name().as_str() {
        "hf" | "huggingface" => ApiProviderKind::HuggingFace,
        "openai" | "gpt" => ApiProviderKind::OpenAI,
        _ => ApiProviderKind::Custom,
    }
}

fn build_api_payload(provider: ApiProviderKind, texts: &[String], model_name: &str) -> Value {
    match provider {
        ApiProviderKind::HuggingFace => json!({ "inputs": texts }),
        ApiProviderKind::OpenAI => json!({ "input": texts, "model": model_name }),
        ApiProviderKind::Custom => json!({ "texts": texts }),
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Embedding>, EmbedError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                EmbedError::Response("missing `embedding` field in data item".into())
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(EmbedError::Response(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(EmbedError::Response("unsupported response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Embedding>, EmbedError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|vector| vec![vector]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Embedding, EmbedError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::Response("non-finite embedding value".into())),
                other => Err(EmbedError::Response(format!(
                    "embedding entries must be numbers, got {other}"
                ))),
            })
            .collect(),
        other => Err(EmbedError::Response(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
