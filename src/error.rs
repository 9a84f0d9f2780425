use thiserror::Error;

/// Central error type for the pipeline engine
///
/// Pipelines are generic over their failure type; any `E: From<PipelineError>`
/// works. Failures raised by stages or the destination are never wrapped, only
/// failures detected by the engine itself are expressed through this type.
#[derive(Error, Debug)]
pub enum PipelineError {
    // ============================================================================
    // Run Errors
    // ============================================================================
    #[error("No payload was sent through the pipeline")]
    PayloadNotSent,

    #[error("Pipe '{pipe}' does not expose method '{method}' and is not invokable")]
    NotInvokable { pipe: String, method: String },

    #[error("Stage failed: {0}")]
    StageFailed(String),

    // ============================================================================
    // Resolution Errors
    // ============================================================================
    #[error("Failed to resolve pipe: {0}")]
    Resolve(#[from] ResolveError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to turn a pipe identifier into an invokable pipe
///
/// The pipeline recovers from these locally by falling back to a degenerate
/// pipe named after the identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No container has been configured")]
    NoContainer,

    #[error("No pipe registered under '{0}'")]
    NotRegistered(String),

    #[error("Failed to construct pipe '{name}': {reason}")]
    ConstructionFailed { name: String, reason: String },
}

// Automatic conversion from String so pipes can fail with `?` on messages
impl From<String> for PipelineError {
    fn from(err: String) -> Self {
        PipelineError::StageFailed(err)
    }
}

impl From<&str> for PipelineError {
    fn from(err: &str) -> Self {
        PipelineError::StageFailed(err.to_string())
    }
}

// Helper type alias for Results
pub type PipelineResult<T> = Result<T, PipelineError>;
