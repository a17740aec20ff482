#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::WorkflowDocument;
use crate::utils::{FileSerializer, FileUtils, JsonSerializer};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives the final workflow document and its explanation.
pub trait WorkflowSink: Send + Sync {
    fn deliver(&self, document: &WorkflowDocument, explanation: &str) -> Result<(), AppError>;
}

/// Writes `<name>.json` and `<name>.txt` into a directory.
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn document_path(&self, document: &WorkflowDocument) -> PathBuf {
        self.output_dir
            .join(format!("{}.json", FileUtils::file_stem(&document.name)))
    }

    pub fn explanation_path(&self, document: &WorkflowDocument) -> PathBuf {
        self.output_dir
            .join(format!("{}.txt", FileUtils::file_stem(&document.name)))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl WorkflowSink for FileSink {
    fn deliver(&self, document: &WorkflowDocument, explanation: &str) -> Result<(), AppError> {
        let path = self.document_path(document);
        FileUtils
            .save_to_file(&path, document, &JsonSerializer::pretty())
            .map_err(|e| {
                AppError::new(ErrorCategory::IoError, format!("Failed to write workflow: {:#}", e))
            })?;
        FileUtils::write_text(&self.explanation_path(document), explanation).map_err(|e| {
            AppError::new(ErrorCategory::IoError, format!("Failed to write explanation: {:#}", e))
        })?;
        tracing::info!(path = %path.display(), "workflow written");
        Ok(())
    }
}

/// Workflow JSON on stdout, explanation on stderr.
#[derive(Debug, Default)]
pub struct StdoutSink {
    pub quiet: bool,
}

impl WorkflowSink for StdoutSink {
    fn deliver(&self, document: &WorkflowDocument, explanation: &str) -> Result<(), AppError> {
        let json = document.to_json_pretty()?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
        if !self.quiet {
            eprintln!("{}", explanation.trim_end());
        }
        Ok(())
    }
}
