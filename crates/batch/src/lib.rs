//! vecstore batch normalization
//!
//! Sits between a caller's loosely-typed batch and the bulk endpoints of the
//! vector store. Callers may pass a single id or many, a single vector or many,
//! and so on; this crate resolves all of that into aligned parallel sequences
//! and fails fast on structural problems before anything is sent.
//!
//! ## What gets checked
//!
//! - Insert/upsert needs embeddings or documents; update needs at least one of
//!   embeddings, documents, metadatas.
//! - Documents without embeddings go through the collection's
//!   [`EmbeddingFunction`](embed::EmbeddingFunction), one call per batch.
//! - Ids must be strings and unique within the batch.
//! - Every present column has exactly one row per id, and all embeddings share
//!   a dimension.
//!
//! ## Example
//!
//! ```
//! use batch::{prepare_insert, BatchInput};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let input = BatchInput::new("doc-1").with_embeddings(vec![0.1, 0.2, 0.3]);
//! let batch = prepare_insert(input, None).await.unwrap();
//!
//! assert_eq!(batch.ids, vec!["doc-1"]);
//! assert_eq!(batch.embeddings, vec![vec![0.1, 0.2, 0.3]]);
//! # }
//! ```

mod error;
mod one_or_many;
mod types;
mod validate;

pub use crate::error::BatchError;
pub use crate::one_or_many::OneOrMany;
pub use crate::types::{
    BatchInput, Ids, Metadata, MetadataValue, NormalizedBatch, RecordBatch,
};
pub use crate::validate::{
    normalize_and_validate, normalize_ids, prepare_insert, prepare_query_embeddings,
    prepare_update,
};
pub use embed::Embedding;
