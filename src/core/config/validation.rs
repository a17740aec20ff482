#![allow(clippy::result_large_err)]

use super::FlowsmithConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use url::Url;

/// Hard caps on external call volume per request.
pub const MAX_SEARCH_QUERIES: usize = 3;
pub const MAX_RESEARCH_RESULTS: usize = 5;
/// Results must score strictly above this floor.
pub const MIN_RELEVANCE_SCORE: u32 = 2;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &FlowsmithConfig) -> Result<(), AppError> {
        Self::validate_endpoint("generation.endpoint", &config.generation.endpoint)?;
        Self::validate_endpoint("search.endpoint", &config.search.endpoint)?;

        if !(0.0..=2.0).contains(&config.generation.temperature) {
            return Err(invalid("generation.temperature must be between 0.0 and 2.0"));
        }

        if config.generation.max_tokens == 0 {
            return Err(invalid("generation.max_tokens must be greater than zero"));
        }

        if config.generation.timeout_seconds == 0 || config.search.timeout_seconds == 0 {
            return Err(invalid("timeouts must be greater than zero"));
        }

        if config.search.max_queries == 0 || config.search.max_queries > MAX_SEARCH_QUERIES {
            return Err(invalid(format!(
                "search.max_queries must be between 1 and {}",
                MAX_SEARCH_QUERIES
            )));
        }

        if config.search.max_results == 0 || config.search.max_results > MAX_RESEARCH_RESULTS {
            return Err(invalid(format!(
                "search.max_results must be between 1 and {}",
                MAX_RESEARCH_RESULTS
            )));
        }

        if config.search.min_score < MIN_RELEVANCE_SCORE {
            return Err(invalid(format!(
                "search.min_score must be at least {}",
                MIN_RELEVANCE_SCORE
            )));
        }

        if config.workflow.template_created_by.trim().is_empty() {
            return Err(invalid("workflow.template_created_by cannot be empty"));
        }

        Ok(())
    }

    fn validate_endpoint(field: &str, value: &str) -> Result<(), AppError> {
        let parsed = Url::parse(value)
            .map_err(|e| invalid(format!("{} is not a valid URL: {}", field, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("{} must use http or https", field)));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCategory::ConfigError, message)
}
