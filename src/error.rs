//! Error types for indexing and query operations

/// Result type for index operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while mutating or querying a faceted index
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The exclusive writer lock could not be acquired within the bounded
    /// wait. The operation performed no mutation and may be retried.
    #[error("index is locked by another writer")]
    IndexLocked,

    /// The underlying storage could not be opened or is damaged
    #[error("index corrupt or missing: {0}")]
    CorruptOrMissing(String),

    /// Index initialization failed
    #[error("index initialization failed: {0}")]
    InitFailed(String),

    /// Document indexing failed
    #[error("document indexing failed: {0}")]
    IndexingFailed(String),

    /// Document deletion failed
    #[error("document deletion failed: {0}")]
    DeletionFailed(String),

    /// Query parsing failed
    #[error("query parsing failed: {0}")]
    QueryParsingFailed(String),

    /// Search execution failed
    #[error("search execution failed: {0}")]
    SearchFailed(String),

    /// The query was cancelled cooperatively before completing
    #[error("query cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying engine error
    #[error("engine error: {0}")]
    Engine(String),
}

impl From<tantivy::TantivyError> for IndexError {
    fn from(err: tantivy::TantivyError) -> Self {
        match err {
            tantivy::TantivyError::LockFailure(..) => IndexError::IndexLocked,
            tantivy::TantivyError::DataCorruption(_) => {
                IndexError::CorruptOrMissing(err.to_string())
            }
            other => IndexError::Engine(other.to_string()),
        }
    }
}

impl From<tantivy::query::QueryParserError> for IndexError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        IndexError::QueryParsingFailed(err.to_string())
    }
}
