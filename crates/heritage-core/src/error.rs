use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The graph connection is absent or was never established.
    #[error("Knowledge graph unavailable")]
    StoreUnavailable,

    #[error("Similarity index not ready")]
    IndexNotReady,

    /// The persisted index and its document list do not belong together.
    #[error("Index artifacts mismatch: {0}")]
    IndexMismatch(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Graph query failed: {0}")]
    Graph(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the one condition callers must map to a service-unavailable response.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
