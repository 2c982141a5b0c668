use std::collections::HashMap;

use embed::Embedding;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::one_or_many::OneOrMany;
use crate::BatchError;

/// A scalar metadata value. The store accepts strings, integers, floats and booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Per-record metadata.
pub type Metadata = HashMap<String, MetadataValue>;

/// Record identifiers as supplied by the caller.
///
/// Held as untyped JSON so input that arrives loosely typed (a request file,
/// a scripting bridge) is type-checked by the validator rather than at parse
/// time. Typed callers build it from strings via the `From` impls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ids(OneOrMany<Value>);

impl Ids {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves to a sequence of strings, failing on the first non-string entry.
    pub fn into_strings(self) -> Result<Vec<String>, BatchError> {
        self.0
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::String(id) => Ok(id),
                other => Err(BatchError::IdType {
                    index,
                    found: json_type_name(&other),
                }),
            })
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<&str> for Ids {
    fn from(id: &str) -> Self {
        Ids(OneOrMany::One(Value::from(id)))
    }
}

impl From<String> for Ids {
    fn from(id: String) -> Self {
        Ids(OneOrMany::One(Value::from(id)))
    }
}

impl From<Vec<String>> for Ids {
    fn from(ids: Vec<String>) -> Self {
        Ids(OneOrMany::Many(ids.into_iter().map(Value::from).collect()))
    }
}

impl From<Vec<&str>> for Ids {
    fn from(ids: Vec<&str>) -> Self {
        Ids(OneOrMany::Many(ids.into_iter().map(Value::from).collect()))
    }
}

impl From<&[&str]> for Ids {
    fn from(ids: &[&str]) -> Self {
        Ids(OneOrMany::Many(ids.iter().copied().map(Value::from).collect()))
    }
}

impl From<&[String]> for Ids {
    fn from(ids: &[String]) -> Self {
        Ids(OneOrMany::Many(ids.iter().cloned().map(Value::from).collect()))
    }
}

impl From<OneOrMany<String>> for Ids {
    fn from(ids: OneOrMany<String>) -> Self {
        match ids {
            OneOrMany::One(id) => Ids::from(id),
            OneOrMany::Many(ids) => Ids::from(ids),
        }
    }
}

/// Untyped JSON: a string, or an array of anything. Non-string entries are
/// rejected during validation.
impl From<Value> for Ids {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Ids(OneOrMany::Many(items)),
            other => Ids(OneOrMany::One(other)),
        }
    }
}

/// A batch of records as the caller hands it over, before normalization.
///
/// ```
/// use batch::BatchInput;
///
/// let input = BatchInput::new(vec!["a", "b"])
///     .with_embeddings(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
///     .with_documents(vec!["first", "second"]);
/// assert_eq!(input.ids.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    pub ids: Ids,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<OneOrMany<Embedding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<OneOrMany<Metadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<OneOrMany<String>>,
}

impl BatchInput {
    pub fn new(ids: impl Into<Ids>) -> Self {
        Self {
            ids: ids.into(),
            ..Default::default()
        }
    }

    pub fn with_embeddings(mut self, embeddings: impl Into<OneOrMany<Embedding>>) -> Self {
        self.embeddings = Some(embeddings.into());
        self
    }

    pub fn with_metadatas(mut self, metadatas: impl Into<OneOrMany<Metadata>>) -> Self {
        self.metadatas = Some(metadatas.into());
        self
    }

    pub fn with_documents(mut self, documents: impl Into<OneOrMany<String>>) -> Self {
        self.documents = Some(documents.into());
        self
    }
}

/// Validated parallel sequences. Every present column has `ids.len()` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Embedding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

impl NormalizedBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A validated insert/upsert batch; embeddings are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Embedding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl TryFrom<NormalizedBatch> for RecordBatch {
    type Error = BatchError;

    fn try_from(batch: NormalizedBatch) -> Result<Self, Self::Error> {
        let embeddings = batch.embeddings.ok_or_else(|| {
            BatchError::Internal("embeddings missing from an insert batch".into())
        })?;
        Ok(RecordBatch {
            ids: batch.ids,
            embeddings,
            metadatas: batch.metadatas,
            documents: batch.documents,
        })
    }
}
