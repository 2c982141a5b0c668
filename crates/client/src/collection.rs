use std::fmt;
use std::sync::Arc;

use batch::{
    normalize_ids, prepare_insert, prepare_query_embeddings, prepare_update, BatchInput, Metadata,
};
use embed::EmbeddingFunction;
use serde_json::Value;
use tracing::debug;

use crate::api::{
    CollectionModel, DeleteOptions, DeleteRequest, GetOptions, GetRequest, GetResult,
    ModifyCollectionRequest, QueryOptions, QueryRequest, QueryResult,
};
use crate::error::ClientResult;
use crate::http::Transport;

const DEFAULT_PEEK_LIMIT: usize = 10;

/// Handle to one collection on the service.
///
/// Every batch is normalized and validated locally before it is sent; a
/// rejected batch never reaches the network. Documents without embeddings are
/// embedded through the handle's [`EmbeddingFunction`], if it has one.
#[derive(Clone)]
pub struct Collection {
    model: CollectionModel,
    transport: Arc<Transport>,
    embedder: Option<Arc<dyn EmbeddingFunction>>,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.model.name)
            .field("id", &self.model.id)
            .field("metadata", &self.model.metadata)
            .field("has_embedder", &self.embedder.is_some())
            .finish()
    }
}

impl Collection {
    pub(crate) fn new(
        model: CollectionModel,
        transport: Arc<Transport>,
        embedder: Option<Arc<dyn EmbeddingFunction>>,
    ) -> Self {
        Self {
            model,
            transport,
            embedder,
        }
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn id(&self) -> &str {
        &self.model.id
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.model.metadata.as_ref()
    }

    pub fn model(&self) -> &CollectionModel {
        &self.model
    }

    /// Inserts new records. Embeddings or documents are required.
    pub async fn add(&self, input: BatchInput) -> ClientResult<()> {
        self.insert("add", input).await
    }

    /// Inserts records, overwriting any with the same id.
    pub async fn upsert(&self, input: BatchInput) -> ClientResult<()> {
        self.insert("upsert", input).await
    }

    /// Updates existing records. Only the supplied columns change.
    pub async fn update(&self, input: BatchInput) -> ClientResult<()> {
        let batch = prepare_update(input, self.embedder()).await?;
        debug!(collection = %self.model.name, rows = batch.len(), "vecstore_update");
        let _: Value = self.transport.post(&self.path("update"), &batch).await?;
        Ok(())
    }

    pub async fn get(&self, options: GetOptions) -> ClientResult<GetResult> {
        let request = GetRequest {
            ids: normalize_ids(options.ids)?,
            r#where: options.r#where,
            where_document: options.where_document,
            limit: options.limit,
            offset: options.offset,
            include: options.include,
        };
        self.transport.post(&self.path("get"), &request).await
    }

    /// First `limit` records (10 when `None`).
    pub async fn peek(&self, limit: Option<usize>) -> ClientResult<GetResult> {
        self.get(GetOptions::default().with_limit(limit.unwrap_or(DEFAULT_PEEK_LIMIT)))
            .await
    }

    /// Deletes matching records and returns the ids the service removed.
    pub async fn delete(&self, options: DeleteOptions) -> ClientResult<Vec<String>> {
        let request = DeleteRequest {
            ids: normalize_ids(options.ids)?,
            r#where: options.r#where,
            where_document: options.where_document,
        };
        let deleted: Option<Vec<String>> =
            self.transport.post(&self.path("delete"), &request).await?;
        Ok(deleted.unwrap_or_default())
    }

    /// Nearest-neighbour search by vectors or by texts embedded on the fly.
    pub async fn query(&self, options: QueryOptions) -> ClientResult<QueryResult> {
        let query_embeddings = prepare_query_embeddings(
            options.query_embeddings,
            options.query_texts,
            self.embedder(),
        )
        .await?;
        let request = QueryRequest {
            query_embeddings,
            n_results: options.n_results,
            r#where: options.r#where,
            where_document: options.where_document,
            include: options.include,
        };
        self.transport.post(&self.path("query"), &request).await
    }

    pub async fn count(&self) -> ClientResult<u64> {
        self.transport.get(&self.path("count")).await
    }

    /// Renames the collection and/or replaces its metadata. The handle reflects
    /// the change once the service accepts it.
    pub async fn modify(
        &mut self,
        new_name: Option<&str>,
        new_metadata: Option<Metadata>,
    ) -> ClientResult<()> {
        let request = ModifyCollectionRequest {
            new_name,
            new_metadata: new_metadata.as_ref(),
        };
        let _: Value = self
            .transport
            .put(&format!("/collections/{}", self.model.id), &request)
            .await?;

        if let Some(name) = new_name {
            self.model.name = name.to_string();
        }
        if new_metadata.is_some() {
            self.model.metadata = new_metadata;
        }
        Ok(())
    }

    async fn insert(&self, op: &'static str, input: BatchInput) -> ClientResult<()> {
        let batch = prepare_insert(input, self.embedder()).await?;
        debug!(collection = %self.model.name, op, rows = batch.len(), "vecstore_insert");
        let _: Value = self.transport.post(&self.path(op), &batch).await?;
        Ok(())
    }

    fn embedder(&self) -> Option<&dyn EmbeddingFunction> {
        self.embedder.as_deref()
    }

    fn path(&self, op: &str) -> String {
        format!("/collections/{}/{op}", self.model.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use batch::BatchError;
    use crate::error::ClientError;

    // Nothing listens on this port; any request that escapes validation
    // surfaces as a transport error instead of the expected batch error.
    fn offline_collection(embedder: Option<Arc<dyn EmbeddingFunction>>) -> Collection {
        let transport = Transport::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        Collection::new(
            CollectionModel {
                id: "c0ffee".into(),
                name: "docs".into(),
                metadata: None,
            },
            Arc::new(transport),
            embedder,
        )
    }

    #[test]
    fn op_paths_use_collection_id() {
        let collection = offline_collection(None);
        assert_eq!(collection.path("add"), "/collections/c0ffee/add");
        assert_eq!(collection.path("count"), "/collections/c0ffee/count");
    }

    #[test]
    fn debug_hides_transport() {
        let debug = format!("{:?}", offline_collection(None));
        assert!(debug.contains("docs"));
        assert!(debug.contains("has_embedder: false"));
    }

    #[tokio::test]
    async fn add_without_payload_fails_locally() {
        let err = offline_collection(None)
            .add(BatchInput::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Batch(BatchError::MissingInput)));
    }

    #[tokio::test]
    async fn documents_without_embedder_fail_locally() {
        let err = offline_collection(None)
            .upsert(BatchInput::new("a").with_documents("hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Batch(BatchError::EmbeddingFunctionMissing)
        ));
    }

    #[tokio::test]
    async fn empty_update_fails_locally() {
        let err = offline_collection(None)
            .update(BatchInput::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Batch(BatchError::NothingToUpdate)));
    }

    #[tokio::test]
    async fn query_needs_exactly_one_source() {
        let collection = offline_collection(None);
        let err = collection.query(QueryOptions::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Batch(BatchError::MissingQuery)));

        let mut both = QueryOptions::texts("hi");
        both.query_embeddings = Some(vec![0.1_f32, 0.2].into());
        let err = collection.query(both).await.unwrap_err();
        assert!(matches!(err, ClientError::Batch(BatchError::AmbiguousQuery)));
    }

    #[tokio::test]
    async fn non_string_id_in_get_fails_locally() {
        let options = GetOptions::ids(serde_json::json!(["a", 7]));
        let err = offline_collection(None).get(options).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Batch(BatchError::IdType { index: 1, .. })
        ));
    }
}
