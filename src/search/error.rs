/// Internal search faults / 搜索内部错误
///
/// Caught at the `SearchEngine::search` boundary and turned into a
/// `SearchOutcome::Failure`; never surfaced as a panic.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Query vector and item vector disagree on dimension.
    #[error("dimension mismatch: item has {expected}-dim vectors, query has {found}-dim")]
    DimensionMismatch { expected: usize, found: usize },

    /// Anything else that went wrong while scoring.
    #[error("internal search fault: {0}")]
    Internal(String),
}
