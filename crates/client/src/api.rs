//! Request and response bodies exchanged with the vector-store service.

use batch::{Embedding, Ids, Metadata, OneOrMany};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields a `get`/`query` may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Documents,
    Embeddings,
    Metadatas,
    Distances,
}

/// A collection as the service describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCollectionRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Metadata>,
    pub get_or_create: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyCollectionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_metadata: Option<&'a Metadata>,
}

/// Selection for [`Collection::get`](crate::Collection::get).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub ids: Option<Ids>,
    /// Metadata filter in the service's `where` syntax.
    pub r#where: Option<Value>,
    /// Document filter, e.g. `{"$contains": "rust"}`.
    pub where_document: Option<Value>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include: Option<Vec<Include>>,
}

impl GetOptions {
    pub fn ids(ids: impl Into<Ids>) -> Self {
        Self {
            ids: Some(ids.into()),
            ..Default::default()
        }
    }

    pub fn with_where(mut self, filter: Value) -> Self {
        self.r#where = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Value) -> Self {
        self.where_document = Some(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_include(mut self, include: impl IntoIterator<Item = Include>) -> Self {
        self.include = Some(include.into_iter().collect());
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

/// Records returned by `get`/`peek`. Columns not requested come back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    pub ids: Vec<String>,
    #[serde(default)]
    pub embeddings: Option<Vec<Embedding>>,
    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
}

/// Selection for [`Collection::delete`](crate::Collection::delete).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    pub ids: Option<Ids>,
    pub r#where: Option<Value>,
    pub where_document: Option<Value>,
}

impl DeleteOptions {
    pub fn ids(ids: impl Into<Ids>) -> Self {
        Self {
            ids: Some(ids.into()),
            ..Default::default()
        }
    }

    pub fn with_where(mut self, filter: Value) -> Self {
        self.r#where = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Value) -> Self {
        self.where_document = Some(filter);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Value>,
}

/// Parameters for [`Collection::query`](crate::Collection::query).
///
/// Exactly one of `query_embeddings` and `query_texts` must be set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub query_embeddings: Option<OneOrMany<Embedding>>,
    pub query_texts: Option<OneOrMany<String>>,
    pub n_results: usize,
    pub r#where: Option<Value>,
    pub where_document: Option<Value>,
    pub include: Option<Vec<Include>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            query_embeddings: None,
            query_texts: None,
            n_results: 10,
            r#where: None,
            where_document: None,
            include: None,
        }
    }
}

impl QueryOptions {
    pub fn embeddings(query_embeddings: impl Into<OneOrMany<Embedding>>) -> Self {
        Self {
            query_embeddings: Some(query_embeddings.into()),
            ..Default::default()
        }
    }

    pub fn texts(query_texts: impl Into<OneOrMany<String>>) -> Self {
        Self {
            query_texts: Some(query_texts.into()),
            ..Default::default()
        }
    }

    pub fn with_n_results(mut self, n_results: usize) -> Self {
        self.n_results = n_results;
        self
    }

    pub fn with_where(mut self, filter: Value) -> Self {
        self.r#where = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Value) -> Self {
        self.where_document = Some(filter);
        self
    }

    pub fn with_include(mut self, include: impl IntoIterator<Item = Include>) -> Self {
        self.include = Some(include.into_iter().collect());
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest {
    pub query_embeddings: Vec<Embedding>,
    pub n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

/// Nearest neighbours, one inner list per query vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub embeddings: Option<Vec<Vec<Embedding>>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<f32>>>,
}
