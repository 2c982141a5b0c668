use batch::BatchError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`VectorStoreClient`](crate::VectorStoreClient) and
/// [`Collection`](crate::Collection).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The batch failed normalization/validation; nothing was sent.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The service reported a failure. `message` is the service's own text.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid client config: {0}")]
    InvalidConfig(String),

    /// A collection name that cannot be used as a URL path segment.
    #[error("invalid collection name `{0}`")]
    InvalidName(String),
}

impl ClientError {
    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_unchanged() {
        let err = ClientError::Remote {
            status: 500,
            message: "ValueError('Collection foo does not exist.')".into(),
        };
        assert_eq!(err.to_string(), "ValueError('Collection foo does not exist.')");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn batch_errors_pass_through() {
        let err: ClientError = BatchError::MissingInput.into();
        assert_eq!(err.to_string(), BatchError::MissingInput.to_string());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_error_display() {
        let err = ClientError::Transport("connection refused".into());
        assert!(err.to_string().contains("transport error"));
    }
}
