use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no entry for {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("could not encode or decode value: {0}")]
    Serialization(String),
}
