//! vecstore client
//!
//! Async HTTP client for a vector-store service. Configuration is captured
//! once in [`ClientConfig`]; the API key and any static headers it names are
//! attached to every request the client and its [`Collection`] handles send.
//!
//! Record batches pass through [`batch`] normalization before they leave the
//! process, so structural mistakes (duplicate ids, misaligned columns,
//! documents with no way to embed them) fail locally with a
//! [`ClientError::Batch`]. Errors the service reports come back as
//! [`ClientError::Remote`] carrying the service's own message.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use client::{ClientConfig, QueryOptions, VectorStoreClient};
//! use batch::BatchInput;
//! use embed::StubEmbedder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), client::ClientError> {
//! let cfg = ClientConfig::new("http://localhost:8000").with_api_key("secret");
//! let client = VectorStoreClient::new(cfg)?;
//!
//! let docs = client
//!     .get_or_create_collection("docs", None, Some(Arc::new(StubEmbedder::new(64))))
//!     .await?;
//! docs.add(BatchInput::new(vec!["a", "b"]).with_documents(vec!["alpha", "beta"]))
//!     .await?;
//!
//! let hits = docs.query(QueryOptions::texts("alpha").with_n_results(1)).await?;
//! println!("{:?}", hits.ids);
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod collection;
mod config;
mod error;
mod http;

pub use crate::api::{
    CollectionModel, DeleteOptions, GetOptions, GetResult, Include, QueryOptions, QueryResult,
};
pub use crate::client::VectorStoreClient;
pub use crate::collection::Collection;
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult};
