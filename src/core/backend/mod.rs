//! Clients for the external generative and search services.

use crate::core::error::StageError;
use async_trait::async_trait;

pub mod duckduckgo;
pub mod openrouter;

pub use duckduckgo::DuckDuckGoClient;
pub use openrouter::OpenRouterClient;

/// Text-completion service used for request analysis and workflow synthesis.
/// Implementations bound every call with their own timeout.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Identifier used in logs.
    fn backend_name(&self) -> &'static str;

    /// False when a call is known to fail before it is made (no credentials).
    fn is_configured(&self) -> bool;

    /// Send a single-turn prompt and return the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, StageError>;
}

/// Raw hit returned by a search service before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search service. Implementations bound every call with their own timeout.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, StageError>;
}

/// Generative backend that is never available. Used when generation is not
/// configured so every stage takes its local fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

#[async_trait]
impl GenerativeBackend for OfflineBackend {
    fn backend_name(&self) -> &'static str {
        "offline"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str) -> Result<String, StageError> {
        Err(StageError::BackendUnavailable(
            "no generative backend configured".to_string(),
        ))
    }
}

/// Search backend returning nothing, for runs with research disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

#[async_trait]
impl SearchBackend for DisabledSearch {
    fn backend_name(&self) -> &'static str {
        "disabled"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, StageError> {
        Ok(Vec::new())
    }
}
