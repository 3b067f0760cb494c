use thiserror::Error;

/// Errors raised when loading a document supplied by the host
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document root must be a container, found {0}")]
    RootNotContainer(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),
}

/// Result type alias for document loading
pub type DocumentResult<T> = Result<T, DocumentError>;
