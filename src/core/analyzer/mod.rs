use crate::core::backend::GenerativeBackend;
use crate::core::entities::{
    truncate_chars, Complexity, IntentRecord, TriggerType, DEFAULT_DATA_FLOW, DEFAULT_SERVICE,
    MAX_INTENT_CHARS, MAX_SEARCH_KEYWORDS,
};
use crate::core::prompt::PromptBuilder;
use crate::core::workflow::GeneratedOutput;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Keyword to service identifier. Several keywords may name one service.
const SERVICE_KEYWORDS: &[(&str, &str)] = &[
    ("sheet", "google-sheets"),
    ("spreadsheet", "google-sheets"),
    ("gmail", "gmail"),
    ("email", "gmail"),
    ("mail", "gmail"),
    ("slack", "slack"),
    ("api", "http-request"),
    ("http", "http-request"),
    ("webhook", "webhook"),
    ("telegram", "telegram"),
    ("discord", "discord"),
    ("notion", "notion"),
    ("airtable", "airtable"),
    ("trello", "trello"),
    ("github", "github"),
    ("postgres", "postgres"),
    ("mysql", "mysql"),
    ("openai", "openai"),
];

const SCHEDULE_WORDS: &[&str] = &["schedule", "daily", "hourly", "time"];
const EMAIL_WORDS: &[&str] = &["email", "mail"];
const STOP_WORDS: &[&str] = &["when", "then", "with", "from", "this", "that"];
const MIN_KEYWORD_CHARS: usize = 4;

/// How an intent record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Generated,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub record: IntentRecord,
    pub source: AnalysisSource,
}

/// Turns a free-text request into an intent record.
pub struct RequestAnalyzer {
    backend: Arc<dyn GenerativeBackend>,
}

impl RequestAnalyzer {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    pub async fn analyze(&self, text: &str) -> IntentRecord {
        self.analyze_detailed(text).await.record
    }

    /// Ask the backend first; any failure or unusable output falls back to
    /// the heuristic extractor.
    pub async fn analyze_detailed(&self, text: &str) -> Analysis {
        if !self.backend.is_configured() {
            tracing::debug!(backend = self.backend.backend_name(), "backend not configured, using heuristic analysis");
            return heuristic(text);
        }

        let raw = match self.backend.complete(&PromptBuilder::analysis_prompt(text)).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(category = %err.category(), error = %err, "request analysis failed, using heuristic");
                return heuristic(text);
            }
        };

        let record = match GeneratedOutput::from_text(&raw) {
            GeneratedOutput::Parsed(object) => {
                IntentRecord::from_generated(&serde_json::Value::Object(object), text)
            }
            GeneratedOutput::Unparsable => None,
        };

        match record {
            Some(record) => Analysis {
                record,
                source: AnalysisSource::Generated,
            },
            None => {
                tracing::warn!("analysis response was not a JSON object, using heuristic");
                heuristic(text)
            }
        }
    }
}

fn heuristic(text: &str) -> Analysis {
    Analysis {
        record: heuristic_intent(text),
        source: AnalysisSource::Heuristic,
    }
}

/// Deterministic intent extraction used when no backend answer is usable.
pub fn heuristic_intent(text: &str) -> IntentRecord {
    let lowered = text.to_lowercase();
    IntentRecord {
        intent: truncate_chars(text, MAX_INTENT_CHARS),
        trigger_type: detect_trigger(&lowered),
        services_needed: detect_services(&lowered),
        data_flow: DEFAULT_DATA_FLOW.to_string(),
        business_rules: Vec::new(),
        custom_requirements: IndexMap::new(),
        complexity: Complexity::Medium,
        search_keywords: extract_keywords(&lowered),
        similar_use_cases: Vec::new(),
    }
}

fn detect_trigger(lowered: &str) -> TriggerType {
    if SCHEDULE_WORDS.iter().any(|w| lowered.contains(w)) {
        TriggerType::Schedule
    } else if EMAIL_WORDS.iter().any(|w| lowered.contains(w)) {
        TriggerType::Email
    } else {
        TriggerType::Webhook
    }
}

/// Services in order of their first mention in the text.
fn detect_services(lowered: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = Vec::new();
    for &(keyword, service) in SERVICE_KEYWORDS {
        let Some(pos) = lowered.find(keyword) else {
            continue;
        };
        match found.iter_mut().find(|(_, s)| *s == service) {
            Some(entry) => entry.0 = entry.0.min(pos),
            None => found.push((pos, service)),
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let services: Vec<String> = found.into_iter().map(|(_, s)| s.to_string()).collect();
    if services.is_empty() {
        vec![DEFAULT_SERVICE.to_string()]
    } else {
        services
    }
}

fn extract_keywords(lowered: &str) -> Vec<String> {
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .take(MAX_SEARCH_KEYWORDS)
        .map(str::to_string)
        .collect()
}
