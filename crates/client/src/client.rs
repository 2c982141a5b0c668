use std::sync::Arc;

use batch::Metadata;
use embed::EmbeddingFunction;
use serde_json::Value;
use tracing::info;

use crate::api::{CollectionModel, CreateCollectionRequest};
use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::Transport;

/// Entry point to a vector-store service.
///
/// Cloning is cheap; clones and every [`Collection`] they hand out share one
/// connection pool and one header set.
#[derive(Debug, Clone)]
pub struct VectorStoreClient {
    transport: Arc<Transport>,
}

impl VectorStoreClient {
    /// Builds a client. Fails on an invalid base URL or malformed headers.
    pub fn new(cfg: ClientConfig) -> ClientResult<Self> {
        let transport = Transport::new(&cfg)?;
        info!(
            base_url = %cfg.base_url,
            static_headers = cfg.headers.len(),
            api_key = cfg.api_key.is_some(),
            "vecstore_client_ready"
        );
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Server time in nanoseconds.
    pub async fn heartbeat(&self) -> ClientResult<u64> {
        let body: Value = self.transport.get("/heartbeat").await?;
        body.get("nanosecond heartbeat")
            .and_then(Value::as_u64)
            .ok_or_else(|| ClientError::Decode(format!("unexpected heartbeat body: {body}")))
    }

    pub async fn version(&self) -> ClientResult<String> {
        self.transport.get("/version").await
    }

    /// Wipes the whole store. Only allowed when the service is configured for it.
    pub async fn reset(&self) -> ClientResult<bool> {
        self.transport.post("/reset", &Value::Null).await
    }

    pub async fn list_collections(&self) -> ClientResult<Vec<CollectionModel>> {
        self.transport.get("/collections").await
    }

    /// Creates a collection; the service rejects a name that already exists.
    pub async fn create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        embedder: Option<Arc<dyn EmbeddingFunction>>,
    ) -> ClientResult<Collection> {
        self.create(name, metadata, embedder, false).await
    }

    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        embedder: Option<Arc<dyn EmbeddingFunction>>,
    ) -> ClientResult<Collection> {
        self.create(name, metadata, embedder, true).await
    }

    pub async fn get_collection(
        &self,
        name: &str,
        embedder: Option<Arc<dyn EmbeddingFunction>>,
    ) -> ClientResult<Collection> {
        let model: CollectionModel = self
            .transport
            .get(&collection_path(name)?)
            .await?;
        Ok(Collection::new(model, Arc::clone(&self.transport), embedder))
    }

    pub async fn delete_collection(&self, name: &str) -> ClientResult<()> {
        let _: Value = self
            .transport
            .delete(&collection_path(name)?)
            .await?;
        Ok(())
    }

    async fn create(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        embedder: Option<Arc<dyn EmbeddingFunction>>,
        get_or_create: bool,
    ) -> ClientResult<Collection> {
        let request = CreateCollectionRequest {
            name,
            metadata: metadata.as_ref(),
            get_or_create,
        };
        let model: CollectionModel = self.transport.post("/collections", &request).await?;
        Ok(Collection::new(model, Arc::clone(&self.transport), embedder))
    }
}

/// `/collections/{name}`. Names that would change the route (`/`, `?`, `#`,
/// `%`, whitespace or control characters) are refused before any request.
fn collection_path(name: &str) -> ClientResult<String> {
    let routable = !name.is_empty()
        && !name
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control());
    if !routable {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(format!("/collections/{name}"))
}
