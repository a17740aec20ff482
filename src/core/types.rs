use serde::{Deserialize, Serialize};

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    BackendUnavailable,
    MalformedResponse,
    SearchFailure,
    ConfigError,
    ValidationError,
    SerializationError,
    IoError,
    InternalError,
    Unknown,
}

impl ErrorCategory {
    /// Stage failures the pipeline recovers from locally.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            ErrorCategory::BackendUnavailable
                | ErrorCategory::MalformedResponse
                | ErrorCategory::SearchFailure
        )
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}

/// Which stage produced the delivered workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowOrigin {
    /// Generated by the backend and normalized.
    Generated,
    /// Canonical minimal workflow.
    Fallback,
}

impl std::fmt::Display for WorkflowOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowOrigin::Generated => write!(f, "generated"),
            WorkflowOrigin::Fallback => write!(f, "fallback"),
        }
    }
}
