use std::collections::HashMap;
use std::time::Instant;

use embed::{Embedding, EmbeddingFunction};
use tracing::{debug, warn, Instrument, Level};

use crate::one_or_many::OneOrMany;
use crate::types::{BatchInput, Ids, NormalizedBatch, RecordBatch};
use crate::BatchError;

/// Normalizes a caller batch into aligned sequences and validates it.
///
/// Steps run in a fixed order and stop at the first failure:
///
/// 1. `require_embeddings_or_documents` with neither present → [`BatchError::MissingInput`].
/// 2. Documents without embeddings are embedded through `embedder`
///    ([`BatchError::EmbeddingFunctionMissing`] when there is none).
/// 3. `require_embeddings_or_documents` with embeddings still absent → [`BatchError::Internal`].
/// 4. Every field is resolved to a sequence.
/// 5. Every id must be a string ([`BatchError::IdType`]).
/// 6. Every present column must have one row per id ([`BatchError::LengthMismatch`]).
/// 7. Ids must be unique ([`BatchError::DuplicateIds`]).
/// 8. Embeddings must share one dimension ([`BatchError::DimensionMismatch`]).
///
/// The embedding call in step 2 is the only I/O; it happens once per batch.
pub async fn normalize_and_validate(
    require_embeddings_or_documents: bool,
    input: BatchInput,
    embedder: Option<&dyn EmbeddingFunction>,
) -> Result<NormalizedBatch, BatchError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::DEBUG,
        "batch.normalize_and_validate",
        rows = input.ids.len(),
        require_embeddings_or_documents
    );

    let result = normalize_inner(require_embeddings_or_documents, input, embedder)
        .instrument(span)
        .await;
    report("normalize_and_validate", &result, start);
    result
}

/// Insert/upsert path: embeddings or documents must be present.
pub async fn prepare_insert(
    input: BatchInput,
    embedder: Option<&dyn EmbeddingFunction>,
) -> Result<RecordBatch, BatchError> {
    normalize_and_validate(true, input, embedder)
        .await?
        .try_into()
}

/// Targeted-update path: any subset of embeddings, documents, and metadatas may
/// be present, but not none of them.
pub async fn prepare_update(
    input: BatchInput,
    embedder: Option<&dyn EmbeddingFunction>,
) -> Result<NormalizedBatch, BatchError> {
    if input.embeddings.is_none() && input.documents.is_none() && input.metadatas.is_none() {
        warn!(error = %BatchError::NothingToUpdate, "batch_validation_failure");
        return Err(BatchError::NothingToUpdate);
    }
    normalize_and_validate(false, input, embedder).await
}

/// Resolves the query vectors for a similarity query.
///
/// Exactly one of `query_embeddings` and `query_texts` must be supplied; texts
/// are embedded through `embedder`.
pub async fn prepare_query_embeddings(
    query_embeddings: Option<OneOrMany<Embedding>>,
    query_texts: Option<OneOrMany<String>>,
    embedder: Option<&dyn EmbeddingFunction>,
) -> Result<Vec<Embedding>, BatchError> {
    let start = Instant::now();
    let result = match (query_embeddings, query_texts) {
        (None, None) => Err(BatchError::MissingQuery),
        (Some(_), Some(_)) => Err(BatchError::AmbiguousQuery),
        (Some(embeddings), None) => Ok(embeddings.into_vec()),
        (None, Some(texts)) => embed_texts(texts.into_vec(), embedder, "query_embeddings").await,
    };
    report("prepare_query_embeddings", &result, start);
    result
}

/// Resolves optional selection ids for `get`/`delete`. Ids are type-checked
/// but may repeat.
pub fn normalize_ids(ids: Option<Ids>) -> Result<Option<Vec<String>>, BatchError> {
    ids.map(Ids::into_strings).transpose()
}

async fn normalize_inner(
    require_embeddings_or_documents: bool,
    input: BatchInput,
    embedder: Option<&dyn EmbeddingFunction>,
) -> Result<NormalizedBatch, BatchError> {
    let BatchInput {
        ids,
        embeddings,
        metadatas,
        documents,
    } = input;

    if require_embeddings_or_documents && embeddings.is_none() && documents.is_none() {
        return Err(BatchError::MissingInput);
    }

    let documents = documents.map(OneOrMany::into_vec);
    let embeddings = match (embeddings, &documents) {
        (Some(embeddings), _) => Some(embeddings.into_vec()),
        (None, Some(documents)) => {
            Some(embed_texts(documents.clone(), embedder, "embeddings").await?)
        }
        (None, None) => None,
    };

    if require_embeddings_or_documents && embeddings.is_none() {
        return Err(BatchError::Internal(
            "embeddings absent after embedding step".into(),
        ));
    }

    let metadatas = metadatas.map(OneOrMany::into_vec);
    let ids = ids.into_strings()?;

    check_len("embeddings", ids.len(), embeddings.as_deref())?;
    check_len("metadatas", ids.len(), metadatas.as_deref())?;
    check_len("documents", ids.len(), documents.as_deref())?;
    check_unique(&ids)?;
    if let Some(embeddings) = embeddings.as_deref() {
        check_dimensions(embeddings)?;
    }

    Ok(NormalizedBatch {
        ids,
        embeddings,
        metadatas,
        documents,
    })
}

async fn embed_texts(
    texts: Vec<String>,
    embedder: Option<&dyn EmbeddingFunction>,
    field: &'static str,
) -> Result<Vec<Embedding>, BatchError> {
    let embedder = embedder.ok_or(BatchError::EmbeddingFunctionMissing)?;
    let vectors = embedder.generate(&texts).await?;
    if vectors.len() != texts.len() {
        return Err(BatchError::LengthMismatch {
            field,
            expected: texts.len(),
            actual: vectors.len(),
        });
    }
    Ok(vectors)
}

fn check_len<T>(field: &'static str, expected: usize, column: Option<&[T]>) -> Result<(), BatchError> {
    match column {
        Some(column) if column.len() != expected => Err(BatchError::LengthMismatch {
            field,
            expected,
            actual: column.len(),
        }),
        _ => Ok(()),
    }
}

/// Collects every duplicated id once, in order of first appearance.
fn check_unique(ids: &[String]) -> Result<(), BatchError> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
    let mut duplicates = Vec::new();
    for id in ids {
        let count = seen.entry(id.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(id.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(BatchError::DuplicateIds(duplicates))
    }
}

fn check_dimensions(embeddings: &[Embedding]) -> Result<(), BatchError> {
    let Some(expected) = embeddings.first().map(Vec::len) else {
        return Ok(());
    };
    match embeddings
        .iter()
        .enumerate()
        .find(|(_, vector)| vector.len() != expected)
    {
        Some((index, vector)) => Err(BatchError::DimensionMismatch {
            index,
            expected,
            actual: vector.len(),
        }),
        None => Ok(()),
    }
}

fn report<T>(operation: &'static str, result: &Result<T, BatchError>, start: Instant) {
    let elapsed_micros = start.elapsed().as_micros() as u64;
    match result {
        Ok(_) => debug!(operation, elapsed_micros, "batch_validation_success"),
        Err(err) => warn!(operation, error = %err, elapsed_micros, "batch_validation_failure"),
    }
}
