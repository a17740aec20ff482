use flowsmith::core::backend::{DuckDuckGoClient, GenerativeBackend, OpenRouterClient, SearchBackend};
use flowsmith::core::config::{GenerationConfig, SearchConfig};
use flowsmith::core::error::StageError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_PATH: &str = "/api/v1/chat/completions";

fn generation_config(server: &MockServer) -> GenerationConfig {
    GenerationConfig {
        endpoint: format!("{}{}", server.uri(), CHAT_PATH),
        api_key: Some("sk-test".to_string()),
        timeout_seconds: 5,
        ..GenerationConfig::default()
    }
}

fn search_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        endpoint: format!("{}/", server.uri()),
        timeout_seconds: 5,
        query_delay_ms: 0,
        ..SearchConfig::default()
    }
}

#[tokio::test]
async fn test_openrouter_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "meta-llama/llama-3.1-8b-instruct:free",
            "messages": [{"role": "user", "content": "build it"}],
            "max_tokens": 4000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "{\"name\": \"Built\"}"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(generation_config(&server));
    assert!(client.is_configured());
    let reply = client.complete("build it").await.unwrap();
    assert_eq!(reply, "{\"name\": \"Built\"}");
}

#[tokio::test]
async fn test_openrouter_non_200_is_unavailable() {
    let server = MockServer::start().await;
    for status in [201u16, 429, 500] {
        server.reset().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(generation_config(&server));
        let err = client.complete("x").await.unwrap_err();
        assert!(
            matches!(err, StageError::BackendUnavailable(_)),
            "status {} gave {:?}",
            status,
            err
        );
    }
}

#[tokio::test]
async fn test_openrouter_malformed_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(generation_config(&server));
    for _ in 0..2 {
        let err = client.complete("x").await.unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse(_)), "{:?}", err);
    }
}

#[tokio::test]
async fn test_openrouter_without_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = generation_config(&server);
    config.api_key = None;
    let client = OpenRouterClient::new(config);
    assert!(!client.is_configured());
    let err = client.complete("x").await.unwrap_err();
    assert!(matches!(err, StageError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_openrouter_timeout_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]})),
        )
        .mount(&server)
        .await;

    let mut config = generation_config(&server);
    config.timeout_seconds = 1;
    let err = OpenRouterClient::new(config).complete("x").await.unwrap_err();
    assert!(matches!(err, StageError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_duckduckgo_query_and_flattening() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "n8n slack workflow"))
        .and(query_param("format", "json"))
        .and(query_param("no_html", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "",
            "RelatedTopics": [
                {"Text": "Slack - messaging for teams", "FirstURL": "https://duckduckgo.com/Slack"},
                {"Name": "Automation", "Topics": [
                    {"Text": "n8n - workflow automation", "FirstURL": "https://duckduckgo.com/n8n"}
                ]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuckDuckGoClient::new(search_config(&server));
    let hits = client.search("n8n slack workflow").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Slack");
    assert_eq!(hits[1].url, "https://duckduckgo.com/n8n");
}

#[tokio::test]
async fn test_duckduckgo_failures_are_search_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = DuckDuckGoClient::new(search_config(&server));
    for _ in 0..2 {
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, StageError::SearchFailure(_)), "{:?}", err);
    }
}
