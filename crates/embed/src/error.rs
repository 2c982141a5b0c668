use thiserror::Error;

/// Errors surfaced by an [`EmbeddingFunction`](crate::EmbeddingFunction).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmbedError {
    /// Configuration is inconsistent (e.g. API mode without an endpoint).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// The provider could not be reached (connect, DNS, timeout).
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The provider answered with a non-success status.
    #[error("embedding provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered, but the body could not be turned into vectors.
    #[error("unexpected embedding response: {0}")]
    Response(String),
}

impl EmbedError {
    /// Whether repeating the same call may succeed: unreachable provider,
    /// request timeout (408), rate limiting (429) and 5xx statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbedError::Request(_) => true,
            EmbedError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            EmbedError::InvalidConfig(_) | EmbedError::Response(_) => false,
        }
    }
}
