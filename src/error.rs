use std::time::Duration;
use thiserror::Error;

/// Failure of the external sentence classifier. Absorbed per sentence by the
/// scorer; the reason string feeds the fallback metric.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("classifier unavailable")]
    Unavailable,
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
    #[error("classifier transport error: {0}")]
    Transport(String),
    #[error("classifier returned an unexpected response: {0}")]
    BadResponse(String),
    #[error("classifier returned no result")]
    EmptyResult,
}

impl ClassifierError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::Unavailable => "unavailable",
            ClassifierError::Timeout(_) => "timeout",
            ClassifierError::Transport(_) => "transport",
            ClassifierError::BadResponse(_) => "bad_response",
            ClassifierError::EmptyResult => "empty_result",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
