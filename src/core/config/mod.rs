use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Flowsmith configuration loaded from flowsmith.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlowsmithConfig {
    /// Generative backend configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Search backend configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Defaults written into generated workflow documents
    #[serde(default)]
    pub workflow: WorkflowDefaults,
}

/// Generative backend (OpenRouter-compatible chat completion) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat completion endpoint
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token; usually supplied through OPENROUTER_API_KEY
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_generation_timeout")]
    pub timeout_seconds: u64,
}

/// Search backend (DuckDuckGo instant-answer compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,

    /// Upper bound on search calls per request
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,

    /// Pause between consecutive search calls
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Results scoring at or below this are discarded
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

/// Values stamped into generated workflow documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefaults {
    #[serde(default = "default_template_created_by")]
    pub template_created_by: String,

    /// Name used when the generated document has none
    #[serde(default = "default_workflow_name")]
    pub default_name: String,

    /// Term identifying the target automation platform in search results
    #[serde(default = "default_platform_term")]
    pub platform_term: String,
}

// Default functions
fn default_generation_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-3.1-8b-instruct:free".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".to_string()
}

fn default_search_timeout() -> u64 {
    10
}

fn default_max_queries() -> usize {
    3
}

fn default_query_delay_ms() -> u64 {
    1000
}

fn default_max_results() -> usize {
    5
}

fn default_min_score() -> u32 {
    2
}

fn default_template_created_by() -> String {
    "Flowsmith".to_string()
}

fn default_workflow_name() -> String {
    "Generated Automation".to_string()
}

fn default_platform_term() -> String {
    "n8n".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            endpoint: default_generation_endpoint(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_generation_timeout(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// True when a non-blank credential is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            enabled: true,
            endpoint: default_search_endpoint(),
            timeout_seconds: default_search_timeout(),
            max_queries: default_max_queries(),
            query_delay_ms: default_query_delay_ms(),
            max_results: default_max_results(),
            min_score: default_min_score(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

impl Default for WorkflowDefaults {
    fn default() -> Self {
        WorkflowDefaults {
            template_created_by: default_template_created_by(),
            default_name: default_workflow_name(),
            platform_term: default_platform_term(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
