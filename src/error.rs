//! medassist error types

use std::path::PathBuf;
use std::time::Duration;

/// medassist error types
#[derive(Debug, thiserror::Error)]
pub enum MedAssistError {
    // Startup errors
    #[error("artifact not found: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("invalid artifact: {0}")]
    ArtifactInvalid(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vectorization or classification failed for a single request.
    #[error("inference failed: {0}")]
    Inference(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(String),

    // Transport limits
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("too many concurrent requests")]
    Overloaded,
}

/// Coarse classification of an error for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The process must not serve requests.
    Fatal,
    /// The caller sent something unusable.
    Client,
    /// Something went wrong while handling a valid request.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Fatal => "fatal",
            ErrorKind::Client => "client",
            ErrorKind::Internal => "internal",
        }
    }
}

impl MedAssistError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MedAssistError::ArtifactMissing { .. }
            | MedAssistError::ArtifactInvalid(_)
            | MedAssistError::Configuration(_) => ErrorKind::Fatal,
            MedAssistError::InvalidInput(_) | MedAssistError::Json(_) => ErrorKind::Client,
            MedAssistError::Inference(_)
            | MedAssistError::Io(_)
            | MedAssistError::Timeout(_)
            | MedAssistError::Overloaded => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code used in service responses.
    pub fn status_code(&self) -> u16 {
        match self {
            MedAssistError::InvalidInput(_) | MedAssistError::Json(_) => 400,
            MedAssistError::Overloaded => 503,
            MedAssistError::Timeout(_) => 504,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for MedAssistError {
    fn from(err: std::io::Error) -> Self {
        MedAssistError::Io(err.to_string())
    }
}

/// Result type alias for medassist operations
pub type Result<T> = std::result::Result<T, MedAssistError>;
