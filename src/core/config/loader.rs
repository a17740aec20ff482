#![allow(clippy::result_large_err)]

use super::FlowsmithConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "flowsmith.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/flowsmith.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_workspace(workspace_path: &Path) -> Result<FlowsmithConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        Self::load_with_overrides(&config_path)
    }

    /// Load config from an explicit path and apply env overrides.
    pub fn load_with_overrides(path: &Path) -> Result<FlowsmithConfig, AppError> {
        let mut config = Self::load_from_file(path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<FlowsmithConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: FlowsmithConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut FlowsmithConfig) {
        // Generation overrides
        if let Ok(api_key) = env::var("OPENROUTER_API_KEY") {
            if !api_key.trim().is_empty() {
                config.generation.api_key = Some(api_key);
            }
        }

        if let Ok(model) = env::var("OPENROUTER_MODEL") {
            if !model.trim().is_empty() {
                config.generation.model = model;
            }
        }

        if let Ok(endpoint) = env::var("FLOWSMITH_GENERATION_ENDPOINT") {
            config.generation.endpoint = endpoint;
        }

        if let Ok(timeout_str) = env::var("FLOWSMITH_GENERATION_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.generation.timeout_seconds = timeout;
            }
        }

        // Search overrides
        if let Ok(enabled_str) = env::var("FLOWSMITH_SEARCH_ENABLED") {
            if let Ok(enabled) = enabled_str.parse::<bool>() {
                config.search.enabled = enabled;
            }
        }

        if let Ok(endpoint) = env::var("FLOWSMITH_SEARCH_ENDPOINT") {
            config.search.endpoint = endpoint;
        }

        if let Ok(delay_str) = env::var("FLOWSMITH_SEARCH_DELAY_MS") {
            if let Ok(delay) = delay_str.parse::<u64>() {
                config.search.query_delay_ms = delay;
            }
        }

        // Workflow overrides
        if let Ok(created_by) = env::var("FLOWSMITH_TEMPLATE_CREATED_BY") {
            config.workflow.template_created_by = created_by;
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "OPENROUTER_API_KEY - Bearer token for the generative backend (unset: heuristic analysis + minimal workflow)",
            "OPENROUTER_MODEL - Override generation model (default: meta-llama/llama-3.1-8b-instruct:free)",
            "FLOWSMITH_GENERATION_ENDPOINT - Override chat completion endpoint",
            "FLOWSMITH_GENERATION_TIMEOUT - Override generation timeout in seconds (default: 60)",
            "FLOWSMITH_SEARCH_ENABLED - Enable or disable web research (true/false, default: true)",
            "FLOWSMITH_SEARCH_ENDPOINT - Override search endpoint (default: https://api.duckduckgo.com/)",
            "FLOWSMITH_SEARCH_DELAY_MS - Override delay between search calls (default: 1000)",
            "FLOWSMITH_TEMPLATE_CREATED_BY - Override meta.templateCreatedBy (default: Flowsmith)",
        ]
    }
}
