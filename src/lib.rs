//! Workspace umbrella crate for vecstore.
//!
//! Re-exports the client, the batch normalizer and the embedding capability so
//! applications depend on one crate, and adds YAML-driven construction of a
//! configured client plus its embedder ([`VecstoreConfig`]).

pub mod config;

pub use batch::{
    BatchError, BatchInput, Embedding, Ids, Metadata, MetadataValue, NormalizedBatch, OneOrMany,
    RecordBatch, normalize_and_validate, normalize_ids, prepare_insert, prepare_query_embeddings,
    prepare_update,
};
pub use client::{
    ClientConfig, ClientError, ClientResult, Collection, CollectionModel, DeleteOptions,
    GetOptions, GetResult, Include, QueryOptions, QueryResult, VectorStoreClient,
};
pub use embed::{
    EmbedConfig, EmbedError, EmbeddingFunction, HttpEmbedder, RetryConfig, StubEmbedder,
};

pub use crate::config::{ConfigLoadError, EmbeddingMode, EmbeddingYamlConfig, VecstoreConfig};
