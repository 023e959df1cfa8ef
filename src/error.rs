use thiserror::Error;

/// Crate-wide error type.
///
/// `GenerationEngine` does not use this to propagate per-chunk failures --
/// those live in chunk state (see `chunk::ChunkStatus`) and are only
/// summarized in the final run summary. This type covers construction-time
/// and precondition failures: bad config, unreadable input, a merge run
/// against an incomplete chunk set.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("text is empty")]
    EmptyText,

    #[error("chunk numbers are not contiguous: expected 1..={expected}, found {found:?}")]
    NonContiguousChunks { expected: u32, found: Vec<u32> },

    #[error("chunk {chunk} is missing its audio file")]
    MissingAudio { chunk: u32 },

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("task join error: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::TaskJoin(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
