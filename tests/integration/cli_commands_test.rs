use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Binary isolated from the caller's credentials and overrides.
fn flowsmith(workspace: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowsmith").unwrap();
    cmd.current_dir(workspace.path())
        .env_remove("OPENROUTER_API_KEY")
        .env_remove("OPENROUTER_MODEL")
        .env_remove("FLOWSMITH_GENERATION_ENDPOINT")
        .env_remove("FLOWSMITH_SEARCH_ENABLED")
        .env_remove("FLOWSMITH_SEARCH_ENDPOINT")
        .env_remove("FLOWSMITH_REMOTE_AGENT")
        .env_remove("RUST_LOG")
        .env("FLOWSMITH_LOG_FILE", "0");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help_lists_workflow_commands() {
    let tmp = TempDir::new().unwrap();
    flowsmith(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("WORKFLOW COMMANDS"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version_flag() {
    let tmp = TempDir::new().unwrap();
    flowsmith(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_fallback_prints_minimal_workflow() {
    let tmp = TempDir::new().unwrap();
    let output = flowsmith(&tmp)
        .args(["fallback", "--name", "Inbound Hook"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["name"], "Inbound Hook");
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(value["nodes"][0]["parameters"]["httpMethod"], "POST");
    assert_eq!(value["settings"]["executionOrder"], "v1");
}

#[test]
fn test_normalize_reads_stdin() {
    let tmp = TempDir::new().unwrap();
    let output = flowsmith(&tmp)
        .arg("normalize")
        .write_stdin("definitely not json")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["nodes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_normalize_repairs_file() {
    let tmp = TempDir::new().unwrap();
    let draft = tmp.path().join("draft.json");
    fs::write(
        &draft,
        r#"{"name": "Draft", "nodes": [{"type": "n8n-nodes-base.gmail"}]}"#,
    )
    .unwrap();

    let output = flowsmith(&tmp)
        .args(["--quiet", "normalize"])
        .arg(&draft)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["name"], "Draft");
    assert_eq!(value["nodes"][0]["name"], "Gmail");
    assert_eq!(value["nodes"][0]["parameters"]["operation"], "send");
    assert_eq!(value["meta"]["templateCreatedBy"], "Flowsmith");
}

#[test]
fn test_workspace_config_is_applied() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("flowsmith.toml"),
        "[workflow]\ntemplate_created_by = \"Ops\"\n",
    )
    .unwrap();

    let output = flowsmith(&tmp).arg("fallback").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["meta"]["templateCreatedBy"], "Ops");
}

#[test]
fn test_inspect_reports_structure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("flow.json");
    fs::write(
        &path,
        r#"{"name": "Alerts", "nodes": [
            {"id": "1", "name": "Hook", "type": "n8n-nodes-base.webhook"},
            {"id": "2", "name": "Post", "type": "n8n-nodes-base.slack"},
            {"id": "3", "name": "Lonely", "type": "n8n-nodes-base.set"}
        ], "connections": {"Hook": {"main": [[{"node": "Post"}]]}}}"#,
    )
    .unwrap();

    flowsmith(&tmp)
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workflow: Alerts"))
        .stdout(predicate::str::contains("Nodes: 3"))
        .stdout(predicate::str::contains("SLACK_CHANNEL"))
        .stdout(predicate::str::contains("Slack API"))
        .stdout(predicate::str::contains("Unreachable nodes:\n  - Lonely"));
}

#[test]
fn test_inspect_rejects_non_workflow() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "just some notes").unwrap();

    flowsmith(&tmp)
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOT_A_WORKFLOW"));
}

#[test]
fn test_generate_offline_emits_workflow() {
    let tmp = TempDir::new().unwrap();
    let output = flowsmith(&tmp)
        .args([
            "generate",
            "send me a daily email report of new sheet rows",
            "--no-research",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Automation plan"));
    assert!(stderr.contains("minimal workflow"));
}

#[test]
fn test_generate_writes_output_directory() {
    let tmp = TempDir::new().unwrap();
    let example = tmp.path().join("example.json");
    fs::write(&example, r#"{"name": "Reference", "nodes": []}"#).unwrap();

    flowsmith(&tmp)
        .args(["generate", "post github issues to slack", "--no-research", "--quiet"])
        .args(["--output", "workflows"])
        .arg("--example")
        .arg(&example)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Vec<_> = fs::read_dir(tmp.path().join("workflows"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(written.iter().any(|name| name.ends_with(".json")));
    assert!(written.iter().any(|name| name.ends_with(".txt")));
}

#[test]
fn test_plan_json_output() {
    let tmp = TempDir::new().unwrap();
    let output = flowsmith(&tmp)
        .args(["plan", "forward each new mail to slack", "--json", "--no-research"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["analysis"], "heuristic");
    assert_eq!(value["intent"]["triggerType"], "email");
    assert_eq!(value["intent"]["servicesNeeded"][1], "slack");
    assert!(value["research"].as_array().unwrap().is_empty());
}

#[test]
fn test_missing_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    flowsmith(&tmp)
        .args(["--config", "missing.toml", "fallback"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_NOT_FOUND"));
}
