use crate::core::backend::GenerativeBackend;
use crate::core::entities::{IntentRecord, ResearchResult};
use crate::core::error::StageError;
use crate::core::prompt::PromptBuilder;
use serde_json::Value;
use std::sync::Arc;

/// Asks the generative backend for a workflow document.
pub struct WorkflowSynthesizer {
    backend: Arc<dyn GenerativeBackend>,
    platform_term: String,
}

impl WorkflowSynthesizer {
    pub fn new(backend: Arc<dyn GenerativeBackend>, platform_term: &str) -> Self {
        Self {
            backend,
            platform_term: platform_term.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_configured()
    }

    /// Raw completion text. Failures are returned, never partial output.
    pub async fn synthesize(
        &self,
        intent: &IntentRecord,
        research: &[ResearchResult],
        example: Option<&Value>,
    ) -> Result<String, StageError> {
        if !self.backend.is_configured() {
            return Err(StageError::BackendUnavailable(format!(
                "{} backend has no credentials",
                self.backend.backend_name()
            )));
        }

        let prompt = PromptBuilder::generation_prompt(intent, research, example, &self.platform_term);
        tracing::debug!(
            backend = self.backend.backend_name(),
            research = research.len(),
            with_example = example.is_some(),
            "requesting workflow synthesis"
        );

        let raw = self.backend.complete(&prompt).await?;
        if raw.trim().is_empty() {
            return Err(StageError::MalformedResponse("empty completion".to_string()));
        }
        Ok(raw)
    }
}
