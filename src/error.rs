use thiserror::Error;

/// Errors that stop analysis of a single file. A failed file never
/// aborts the run over the remaining files.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The syntax tree is internally inconsistent.
    #[error("inconsistent syntax tree: {0}")]
    Structural(String),

    /// The analysis was configured with an invalid value. Raised before
    /// any file is visited.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
