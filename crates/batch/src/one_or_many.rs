use serde::{Deserialize, Serialize};

use crate::types::Metadata;

/// A caller-supplied value that is either a single item or a sequence of them.
///
/// Resolved once by [`into_vec`](Self::into_vec); a lone item becomes a
/// one-element sequence and sequences pass through unchanged. Deserialization
/// is untagged and tries `Many` first, so `[1.0, 2.0]` read as
/// `OneOrMany<Vec<f32>>` is a single vector while `[[1.0], [2.0]]` is two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn one(item: T) -> Self {
        OneOrMany::One(item)
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::Many(items) => items.len(),
            OneOrMany::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(item: &str) -> Self {
        OneOrMany::One(item.to_owned())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(item: String) -> Self {
        OneOrMany::One(item)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(items: Vec<&str>) -> Self {
        OneOrMany::Many(items.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<f32>> for OneOrMany<Vec<f32>> {
    fn from(vector: Vec<f32>) -> Self {
        OneOrMany::One(vector)
    }
}

impl From<Metadata> for OneOrMany<Metadata> {
    fn from(metadata: Metadata) -> Self {
        OneOrMany::One(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_becomes_single_element() {
        assert_eq!(OneOrMany::one(7).into_vec(), vec![7]);
        assert_eq!(OneOrMany::<String>::from("a").into_vec(), vec!["a".to_string()]);
    }

    #[test]
    fn sequence_passes_through() {
        let many = OneOrMany::<i32>::from(vec![1, 2, 3]);
        assert_eq!(many.len(), 3);
        assert_eq!(many.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn scalar_and_wrapped_scalar_agree() {
        let vector = vec![0.1f32, 0.2];
        let scalar = OneOrMany::<Vec<f32>>::from(vector.clone()).into_vec();
        let wrapped = OneOrMany::<Vec<f32>>::from(vec![vector]).into_vec();
        assert_eq!(scalar, wrapped);
    }

    #[test]
    fn empty_default() {
        let empty: OneOrMany<String> = OneOrMany::default();
        assert!(empty.is_empty());
        assert!(empty.into_vec().is_empty());
    }

    #[test]
    fn untagged_vector_deserialization() {
        let single: OneOrMany<Vec<f32>> = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(single, OneOrMany::One(vec![1.0, 2.0]));

        let many: OneOrMany<Vec<f32>> = serde_json::from_str("[[1.0], [2.0]]").unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn untagged_string_deserialization() {
        let one: OneOrMany<String> = serde_json::from_str(r#""doc""#).unwrap();
        assert_eq!(one, OneOrMany::One("doc".into()));

        let many: OneOrMany<String> = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(many.into_vec(), vec!["a".to_string(), "b".to_string()]);
    }
}
