//! vecstore embedding capability
//!
//! Turns text into vectors for collections that receive documents without
//! embeddings. The vector store never sees this crate directly: the batch
//! normalizer calls [`EmbeddingFunction::generate`] once per batch and ships the
//! result alongside the documents.
//!
//! Two implementations ship here:
//!
//! - [`HttpEmbedder`] - calls a remote provider (Hugging Face, OpenAI, or a
//!   custom `{"texts": [...]}` endpoint) with retry and optional auth headers.
//! - [`StubEmbedder`] - deterministic hash-derived vectors for offline work.
//!
//! Anything else (a local model, a cache in front of a provider) only needs to
//! implement the trait.
//!
//! ## Example
//!
//! ```
//! use embed::{EmbeddingFunction, StubEmbedder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stub = StubEmbedder::new(8);
//! let vectors = stub.generate(&["hello".to_string()]).await.unwrap();
//! assert_eq!(vectors[0].len(), 8);
//! # }
//! ```

use async_trait::async_trait;

pub mod config;
pub mod error;
pub mod retry;

mod api;
mod normalize;
mod serde_millis;
mod stub;

pub use crate::api::HttpEmbedder;
pub use crate::config::EmbedConfig;
pub use crate::error::EmbedError;
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

/// A dense vector.
pub type Embedding = Vec<f32>;

/// Converts an ordered batch of texts into vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    async fn generate(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError>;
}
