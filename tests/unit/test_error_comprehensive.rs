use flowsmith::core::error::{AppError, DefaultErrorReporter, ErrorReporter, StageError};
use flowsmith::core::types::{ErrorCategory, ErrorSeverity};

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::BackendUnavailable,
        ErrorCategory::MalformedResponse,
        ErrorCategory::SearchFailure,
        ErrorCategory::ConfigError,
        ErrorCategory::ValidationError,
        ErrorCategory::SerializationError,
        ErrorCategory::IoError,
        ErrorCategory::InternalError,
        ErrorCategory::Unknown,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert!(error.context.is_empty());
        assert!(error.recovery_suggestions.is_empty());
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
        assert!(error.code.starts_with("ERR-"));
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::BackendUnavailable, ErrorSeverity::Warning),
        (ErrorCategory::MalformedResponse, ErrorSeverity::Warning),
        (ErrorCategory::SearchFailure, ErrorSeverity::Warning),
        (ErrorCategory::ConfigError, ErrorSeverity::Error),
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::SerializationError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::InternalError, ErrorSeverity::Error),
        (ErrorCategory::Unknown, ErrorSeverity::Info),
    ];

    for (category, expected) in test_cases {
        let error = AppError::new(category, "test");
        assert_eq!(error.severity(), expected, "category {:?}", category);
        assert_eq!(
            category.is_recoverable(),
            expected == ErrorSeverity::Warning,
            "category {:?}",
            category
        );
    }
}

#[test]
fn test_builder_methods() {
    let mut error = AppError::new(ErrorCategory::ConfigError, "bad value")
        .with_code("CONFIG_BAD")
        .with_context("search.max_queries")
        .with_suggestion("Use a value between 1 and 3");
    error.add_context("file", "flowsmith.toml");

    assert_eq!(error.code, "CONFIG_BAD");
    assert_eq!(error.context.get("context").unwrap(), "search.max_queries");
    assert_eq!(error.context.get("file").unwrap(), "flowsmith.toml");
    assert_eq!(error.recovery_suggestions.len(), 1);

    let rendered = error.to_string();
    assert!(rendered.starts_with("[CONFIG_BAD] ConfigError: bad value"));
    assert!(rendered.contains("flowsmith.toml"));
}

#[test]
fn test_stage_error_conversion_keeps_category() {
    let cases = vec![
        StageError::BackendUnavailable("no key".into()),
        StageError::MalformedResponse("not json".into()),
        StageError::SearchFailure("timeout".into()),
    ];
    for stage_error in cases {
        let category = stage_error.category();
        let message = stage_error.to_string();
        let error: AppError = stage_error.into();
        assert_eq!(error.category, category);
        assert_eq!(error.message, message);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert_eq!(error.recovery_suggestions.len(), 1);
    }
}

#[test]
fn test_std_conversions() {
    let io_error: AppError =
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing workflow").into();
    assert_eq!(io_error.category, ErrorCategory::IoError);
    assert_eq!(io_error.code, "IO_ERROR");
    assert!(io_error.source.is_some());

    let json_error: AppError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert_eq!(json_error.category, ErrorCategory::SerializationError);

    let anyhow_error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(anyhow_error.category, ErrorCategory::InternalError);
    assert!(anyhow_error.to_string().contains("boom"));
    assert!(anyhow_error.source.is_some());
}

#[test]
fn test_with_source_wraps_error() {
    let source: Box<dyn std::error::Error + Send + Sync> =
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    let error = AppError::with_source(ErrorCategory::IoError, "write failed", source);
    assert!(error.to_string().contains("Caused by: disk full"));
}

#[test]
fn test_app_error_travels_through_anyhow() {
    let error = AppError::new(ErrorCategory::ValidationError, "not a workflow").with_code("NOT_A_WORKFLOW");
    let wrapped: anyhow::Error = error.into();
    let back = wrapped.downcast::<AppError>().unwrap();
    assert_eq!(back.code, "NOT_A_WORKFLOW");
}

#[test]
fn test_default_reporter_does_not_panic() {
    let reporter: Box<dyn ErrorReporter> = Box::new(DefaultErrorReporter::default());
    let error = AppError::new(ErrorCategory::InternalError, "trait test")
        .with_suggestion("retry");
    reporter.report_error(&error);
    reporter.report_warning("research skipped", Some("search disabled".to_string()));
}
