use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Failure of a single pipeline stage call. Every network-calling method
/// returns this so the calling stage can pick its fallback branch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("search failure: {0}")]
    SearchFailure(String),
}

impl StageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StageError::BackendUnavailable(_) => ErrorCategory::BackendUnavailable,
            StageError::MalformedResponse(_) => ErrorCategory::MalformedResponse,
            StageError::SearchFailure(_) => ErrorCategory::SearchFailure,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::BackendUnavailable
            | ErrorCategory::MalformedResponse
            | ErrorCategory::SearchFailure => ErrorSeverity::Warning,
            ErrorCategory::ConfigError
            | ErrorCategory::ValidationError
            | ErrorCategory::SerializationError
            | ErrorCategory::IoError
            | ErrorCategory::InternalError => ErrorSeverity::Error,
            ErrorCategory::Unknown => ErrorSeverity::Info,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: HashMap::new(),
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_context<T: Into<String>>(mut self, context: T) -> Self {
        self.context.insert("context".to_string(), context.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.recovery_suggestions.push(suggestion.into());
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<StageError> for AppError {
    fn from(e: StageError) -> Self {
        let suggestion = match &e {
            StageError::BackendUnavailable(_) => {
                "Check OPENROUTER_API_KEY and the generation endpoint"
            }
            StageError::MalformedResponse(_) => "Retry; the backend returned unusable output",
            StageError::SearchFailure(_) => "Check the search endpoint or disable research",
        };
        AppError::new(e.category(), e.to_string()).with_suggestion(suggestion)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            category: ErrorCategory::InternalError,
            severity: ErrorSeverity::Error,
            code: "ANYHOW_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            recovery_suggestions: vec!["Check the error details".to_string()],
            occurred_at: Utc::now(),
            source: Some(e),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            severity: ErrorSeverity::Error,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            recovery_suggestions: vec!["Check file permissions and paths".to_string()],
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError {
            category: ErrorCategory::SerializationError,
            severity: ErrorSeverity::Error,
            code: "JSON_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            recovery_suggestions: vec!["Check that the input is valid JSON".to_string()],
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

pub trait ErrorReporter {
    fn report_error(&self, error: &AppError);
    fn report_warning(&self, message: &str, context: Option<String>);
}

pub struct DefaultErrorReporter;

impl DefaultErrorReporter {
    pub fn new() -> Self {
        DefaultErrorReporter
    }
}

impl Default for DefaultErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for DefaultErrorReporter {
    fn report_error(&self, error: &AppError) {
        tracing::error!(code = %error.code, category = %error.category, "{}", error.message);
        eprintln!("[ERROR] {}: {}", error.code, error.message);
        if !error.context.is_empty() {
            eprintln!("  Context: {:?}", error.context);
        }
        for suggestion in &error.recovery_suggestions {
            eprintln!("  Hint: {}", suggestion);
        }
        if let Some(ref source) = error.source {
            eprintln!("  Caused by: {}", source);
        }
    }

    fn report_warning(&self, message: &str, context: Option<String>) {
        tracing::warn!("{}", message);
        eprintln!("[WARNING] {}", message);
        if let Some(ref ctx) = context {
            eprintln!("  Context: {}", ctx);
        }
    }
}
