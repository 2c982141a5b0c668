use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::normalize_l2;
use crate::{EmbedError, Embedding, EmbeddingFunction};

/// Deterministic embedder for offline development and tests.
///
/// Generates sinusoid values derived from a hash of the input text, so the
/// same text always maps to the same vector regardless of batch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubEmbedder {
    dim: usize,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            normalize: true,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
        if self.normalize {
            normalize_l2(&mut v);
        }
        v
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingFunction for StubEmbedder {
    async fn generate(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_dimension() {
        let stub = StubEmbedder::new(16);
        assert_eq!(stub.embed_one("hello").len(), 16);
        assert_eq!(StubEmbedder::default().dim(), 384);
    }

    #[test]
    fn same_text_same_vector() {
        let stub = StubEmbedder::new(32);
        assert_eq!(stub.embed_one("same text"), stub.embed_one("same text"));
        assert_ne!(stub.embed_one("hello"), stub.embed_one("world"));
    }

    #[test]
    fn normalized_by_default() {
        let v = StubEmbedder::new(64).embed_one("test");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "got norm={norm}");
    }

    #[test]
    fn values_in_sine_range_without_normalization() {
        let v = StubEmbedder::new(128).with_normalize(false).embed_one("range");
        assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[tokio::test]
    async fn generate_preserves_order_and_length() {
        let stub = StubEmbedder::new(8);
        let texts = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let vectors = stub.generate(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_eq!(vectors[0], stub.embed_one("a"));
        assert_eq!(vectors[1], stub.embed_one("b"));
    }
}
