use embed::EmbedError;
use thiserror::Error;

/// Structural problems detected before a batch is sent.
///
/// Every variant is raised before any network I/O for the batch itself; only
/// [`Embedding`](Self::Embedding) can follow an outbound call, to the
/// embedding provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    /// Insert/upsert without embeddings or documents.
    #[error("embeddings and documents cannot both be absent")]
    MissingInput,
    /// Update that would change nothing.
    #[error("embeddings, documents, and metadatas cannot all be absent for an update")]
    NothingToUpdate,
    /// Query without query embeddings or query texts.
    #[error("query embeddings and query texts cannot both be absent")]
    MissingQuery,
    /// Query that supplies both query embeddings and query texts.
    #[error("supply either query embeddings or query texts, not both")]
    AmbiguousQuery,
    /// Documents need embedding but the collection has no embedding function.
    #[error("documents were supplied without embeddings and no embedding function is configured")]
    EmbeddingFunctionMissing,
    /// A state the earlier checks should have ruled out.
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error("expected ids to be strings, but got {found} at index {index}")]
    IdType { index: usize, found: &'static str },
    #[error("{field} has {actual} entries but ids has {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("expected ids to be unique, found duplicates for: {}", .0.join(", "))]
    DuplicateIds(Vec<String>),
    #[error("embedding at index {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("embedding function failed: {0}")]
    Embedding(#[from] EmbedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_lists_every_value() {
        let err = BatchError::DuplicateIds(vec!["a".into(), "c".into()]);
        assert_eq!(
            err.to_string(),
            "expected ids to be unique, found duplicates for: a, c"
        );
    }

    #[test]
    fn id_type_names_index() {
        let err = BatchError::IdType {
            index: 2,
            found: "number",
        };
        assert!(err.to_string().contains("index 2"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn length_mismatch_names_field() {
        let err = BatchError::LengthMismatch {
            field: "metadatas",
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "metadatas has 1 entries but ids has 2");
    }

    #[test]
    fn update_and_insert_messages_differ() {
        assert_ne!(
            BatchError::MissingInput.to_string(),
            BatchError::NothingToUpdate.to_string()
        );
    }

    #[test]
    fn wraps_embed_errors() {
        let err: BatchError = EmbedError::Request("HTTP error 500".into()).into();
        assert!(err.to_string().contains("embedding function failed"));
        assert!(err.to_string().contains("HTTP error 500"));
    }
}
