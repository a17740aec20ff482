use flowsmith::core::analyzer::AnalysisSource;
use flowsmith::core::config::FlowsmithConfig;
use flowsmith::core::pipeline::{confidence, FileSink, WorkflowPipeline};
use flowsmith::core::types::WorkflowOrigin;
use flowsmith::core::workflow::inspect::dangling_references;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_PATH: &str = "/api/v1/chat/completions";

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn offline_config() -> FlowsmithConfig {
    let mut config = FlowsmithConfig::default();
    config.generation.api_key = None;
    config.search.enabled = false;
    config.search.query_delay_ms = 0;
    config
}

fn mocked_config(server: &MockServer) -> FlowsmithConfig {
    let mut config = FlowsmithConfig::default();
    config.generation.endpoint = format!("{}{}", server.uri(), CHAT_PATH);
    config.generation.api_key = Some("sk-test".to_string());
    config.generation.timeout_seconds = 5;
    config.search.endpoint = format!("{}/search", server.uri());
    config.search.query_delay_ms = 0;
    config.search.timeout_seconds = 5;
    config
}

async fn mount_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RelatedTopics": [
                {"Text": "n8n workflow - copy google sheets rows into slack", "FirstURL": "https://example.com/sheets-slack"},
                {"Text": "Slack - chat", "FirstURL": "https://example.com/slack"}
            ]
        })))
        .mount(server)
        .await;
}

fn generated_workflow() -> String {
    json!({
        "name": "Sheet rows to Slack",
        "nodes": [
            {"id": "trigger", "name": "Every Hour", "type": "n8n-nodes-base.scheduleTrigger", "typeVersion": 1.1},
            {"id": "read", "name": "Read Rows", "type": "n8n-nodes-base.googleSheets", "typeVersion": 4},
            {"id": "post", "name": "Post", "type": "n8n-nodes-base.slack", "typeVersion": 2}
        ],
        "connections": {
            "Every Hour": {"main": [[{"node": "Read Rows", "type": "main", "index": 0}]]},
            "Read Rows": {"main": [[{"node": "Post", "type": "main", "index": 0}]]}
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_offline_request_delivers_minimal_workflow() {
    let pipeline = WorkflowPipeline::from_config(&offline_config());
    let plan = pipeline
        .plan("send me a daily email report of new sheet rows")
        .await;
    assert_eq!(plan.analysis, AnalysisSource::Heuristic);
    assert_eq!(plan.intent.services_needed, vec!["gmail", "google-sheets"]);
    assert!(plan.research.is_empty());
    assert!(plan.explanation.contains("Trigger: schedule"));

    let report = pipeline
        .generate_with_hints(&plan.intent, &plan.research, &[])
        .await;
    assert_eq!(report.origin, WorkflowOrigin::Fallback);
    assert_eq!(report.document.nodes.len(), 2);
    assert_eq!(report.confidence, confidence(&plan.intent, &[], false));
    assert_eq!(report.confidence, 70);
}

#[tokio::test]
async fn test_full_generation_with_backends() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("Automation Request"))
        .respond_with(chat_reply(
            &json!({
                "intent": "Post new sheet rows to Slack every hour",
                "triggerType": "schedule",
                "servicesNeeded": ["google-sheets", "slack"],
                "searchKeywords": ["sheet", "rows", "slack"],
                "businessRules": ["skip empty rows"]
            })
            .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("Output Rules"))
        .and(body_string_contains("Reference Workflow"))
        .respond_with(chat_reply(&format!(
            "Sure, here it is:\n```json\n{}\n```",
            generated_workflow()
        )))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = WorkflowPipeline::from_config(&mocked_config(&server));
    let plan = pipeline.plan("post new sheet rows to slack hourly").await;
    assert_eq!(plan.analysis, AnalysisSource::Generated);
    assert_eq!(plan.intent.business_rules, vec!["skip empty rows"]);
    assert!(!plan.research.is_empty());
    assert_eq!(plan.research[0].url, "https://example.com/sheets-slack");

    let examples: Vec<Value> = vec![json!({"name": "Sheets to Slack", "nodes": []})];
    let report = pipeline
        .generate_with_hints(&plan.intent, &plan.research, &examples)
        .await;
    assert_eq!(report.origin, WorkflowOrigin::Generated);
    assert_eq!(report.document.name, "Sheet rows to Slack");
    assert_eq!(report.document.nodes.len(), 3);
    assert!(dangling_references(&report.document).is_empty());
    assert_eq!(report.document.nodes[1].parameters["operation"], "appendOrUpdate");
    assert_eq!(report.document.nodes[0].type_version.as_f64(), Some(1.1));
    assert!(report.explanation.contains("Generated workflow \"Sheet rows to Slack\""));
    assert!(report.explanation.contains("Slack API"));
    assert_eq!(
        report.confidence,
        confidence(&plan.intent, &plan.research, true)
    );
    assert!(report.confidence > 80);
}

#[tokio::test]
async fn test_backend_outage_degrades_gracefully() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pipeline = WorkflowPipeline::from_config(&mocked_config(&server));
    let plan = pipeline.plan("forward each new mail to slack").await;
    assert_eq!(plan.analysis, AnalysisSource::Heuristic);
    assert!(plan.research.is_empty());

    let document = pipeline.generate(&plan.intent, &plan.research).await;
    assert_eq!(document.nodes.len(), 2);
    assert_eq!(document.connections.len(), 1);
}

#[tokio::test]
async fn test_unparsable_generation_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Automation Request"))
        .respond_with(chat_reply("no idea"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Output Rules"))
        .respond_with(chat_reply("I'm sorry, I can't produce JSON today."))
        .mount(&server)
        .await;

    let mut config = mocked_config(&server);
    config.search.enabled = false;
    let pipeline = WorkflowPipeline::from_config(&config);
    let plan = pipeline.plan("ping the api").await;
    let report = pipeline.generate_with_hints(&plan.intent, &[], &[]).await;
    assert_eq!(report.origin, WorkflowOrigin::Fallback);
    assert!(report.explanation.starts_with("Generation was unavailable"));
}

#[tokio::test]
async fn test_run_delivers_to_file_sink() {
    let tmp = TempDir::new().unwrap();
    let sink = FileSink::new(tmp.path().join("out"));
    let pipeline = WorkflowPipeline::from_config(&offline_config());

    let report = pipeline
        .run("notify the team on slack", &[], &sink)
        .await
        .unwrap();

    let written = std::fs::read_to_string(sink.document_path(&report.document)).unwrap();
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["id"], report.document.id.as_str());
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);

    let explanation = std::fs::read_to_string(sink.explanation_path(&report.document)).unwrap();
    assert!(explanation.starts_with("Automation plan"));
    assert!(explanation.contains("minimal workflow"));
}
