use flowsmith::core::config::{ConfigLoader, ConfigValidator, FlowsmithConfig};
use flowsmith::core::types::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_flowsmith_env() {
    for v in &[
        "OPENROUTER_API_KEY",
        "OPENROUTER_MODEL",
        "FLOWSMITH_GENERATION_ENDPOINT",
        "FLOWSMITH_GENERATION_TIMEOUT",
        "FLOWSMITH_SEARCH_ENABLED",
        "FLOWSMITH_SEARCH_ENDPOINT",
        "FLOWSMITH_SEARCH_DELAY_MS",
        "FLOWSMITH_TEMPLATE_CREATED_BY",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_flowsmith_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[generation]
endpoint = "https://llm.internal.example/v1/chat/completions"
model = "local/model"
temperature = 0.7
max_tokens = 2048
timeout_seconds = 30

[search]
enabled = true
max_queries = 2
query_delay_ms = 0
max_results = 4
min_score = 3

[workflow]
template_created_by = "Ops Team"
default_name = "Ops Automation"
"#;
    fs::write(workspace_path.join("flowsmith.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert_eq!(config.generation.model, "local/model");
    assert_eq!(config.generation.max_tokens, 2048);
    assert_eq!(config.search.max_queries, 2);
    assert_eq!(config.search.min_score, 3);
    assert_eq!(config.search.endpoint, "https://api.duckduckgo.com/");
    assert_eq!(config.workflow.template_created_by, "Ops Team");
    assert_eq!(config.workflow.platform_term, "n8n");
    assert!(!config.generation.has_credentials());
    assert!(ConfigValidator::validate(&config).is_ok());

    env::set_var("OPENROUTER_API_KEY", "sk-test");
    env::set_var("OPENROUTER_MODEL", "other/model");
    env::set_var("FLOWSMITH_SEARCH_ENABLED", "false");
    env::set_var("FLOWSMITH_SEARCH_DELAY_MS", "250");
    env::set_var("FLOWSMITH_TEMPLATE_CREATED_BY", "CI");

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert!(config.generation.has_credentials());
    assert_eq!(config.generation.model, "other/model");
    assert!(!config.search.enabled);
    assert_eq!(config.search.query_delay_ms, 250);
    assert_eq!(config.workflow.template_created_by, "CI");

    clear_flowsmith_env();
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_flowsmith_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let defaults = FlowsmithConfig::default();
    assert_eq!(config.generation.endpoint, defaults.generation.endpoint);
    assert_eq!(config.search.max_results, 5);
    assert_eq!(config.workflow.default_name, "Generated Automation");
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_flowsmith_env();
    env::set_var("FLOWSMITH_GENERATION_TIMEOUT", "soon");
    env::set_var("FLOWSMITH_SEARCH_ENABLED", "maybe");
    env::set_var("OPENROUTER_API_KEY", "   ");

    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config.generation.timeout_seconds, 60);
    assert!(config.search.enabled);
    assert!(!config.generation.has_credentials());

    clear_flowsmith_env();
}

#[test]
#[serial]
fn test_parse_error_is_config_error() {
    clear_flowsmith_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flowsmith.toml");
    fs::write(&path, "[search]\nmax_queries = \"three\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigError);
    assert!(err.message.contains("flowsmith.toml"));
}

#[test]
#[serial]
fn test_validation_rejects_out_of_range_limits() {
    clear_flowsmith_env();
    let temp_dir = TempDir::new().unwrap();
    for body in [
        "[search]\nmax_queries = 4\n",
        "[search]\nmax_results = 0\n",
        "[generation]\nendpoint = \"ftp://example.com\"\n",
        "[workflow]\ntemplate_created_by = \"  \"\n",
    ] {
        fs::write(temp_dir.path().join("flowsmith.toml"), body).unwrap();
        let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(err.category, ErrorCategory::ConfigError, "{}", body);
    }
}

#[test]
fn test_api_key_is_never_serialized() {
    let mut config = FlowsmithConfig::default();
    config.generation.api_key = Some("sk-secret".to_string());
    let rendered = toml::to_string(&config).unwrap();
    assert!(!rendered.contains("sk-secret"));
    assert!(!rendered.contains("api_key"));
}
