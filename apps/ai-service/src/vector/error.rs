use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Vector store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid vector store response: {0}")]
    Decode(String),

    #[error("Index '{name}' not ready after {waited_secs}s")]
    IndexNotReady { name: String, waited_secs: u64 },
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VectorError::Decode(err.to_string())
        } else {
            VectorError::StoreUnavailable(err.to_string())
        }
    }
}
