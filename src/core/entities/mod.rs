use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Maximum length of a heuristically derived intent.
pub const MAX_INTENT_CHARS: usize = 100;
/// Maximum number of search keywords carried by an intent record.
pub const MAX_SEARCH_KEYWORDS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_SNIPPET_CHARS: usize = 300;

pub const DEFAULT_SERVICE: &str = "webhook";
pub const DEFAULT_DATA_FLOW: &str = "Receive data from the trigger, process it, and deliver the result";

/// Kind of event that starts a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Webhook,
    Schedule,
    Email,
    Manual,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Webhook => "webhook",
            TriggerType::Schedule => "schedule",
            TriggerType::Email => "email",
            TriggerType::Manual => "manual",
        }
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webhook" | "http" => Ok(TriggerType::Webhook),
            "schedule" | "cron" | "interval" => Ok(TriggerType::Schedule),
            "email" | "mail" | "gmail" => Ok(TriggerType::Email),
            "manual" => Ok(TriggerType::Manual),
            other => Err(format!("unknown trigger type: {}", other)),
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "low" => Ok(Complexity::Simple),
            "medium" | "moderate" => Ok(Complexity::Medium),
            "complex" | "high" => Ok(Complexity::Complex),
            other => Err(format!("unknown complexity: {}", other)),
        }
    }
}

/// Structured interpretation of a free-text automation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRecord {
    pub intent: String,
    pub trigger_type: TriggerType,
    /// Ordered, duplicate-free and never empty.
    pub services_needed: Vec<String>,
    pub data_flow: String,
    #[serde(default)]
    pub business_rules: Vec<String>,
    #[serde(default)]
    pub custom_requirements: IndexMap<String, Value>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub similar_use_cases: Vec<String>,
}

impl IntentRecord {
    /// Coerce a backend-produced JSON object into an intent record.
    ///
    /// Fields with the wrong shape fall back to the same defaults the
    /// heuristic analyzer uses; list invariants are re-established
    /// afterwards. Returns `None` when `value` is not an object.
    pub fn from_generated(value: &Value, request_text: &str) -> Option<Self> {
        let object = value.as_object()?;

        let intent = object
            .get("intent")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| truncate_chars(request_text, MAX_INTENT_CHARS));

        let trigger_type = object
            .get("triggerType")
            .or_else(|| object.get("trigger_type"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let complexity = object
            .get("complexity")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let data_flow = object
            .get("dataFlow")
            .or_else(|| object.get("data_flow"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_DATA_FLOW)
            .to_string();

        let custom_requirements = object
            .get("customRequirements")
            .or_else(|| object.get("custom_requirements"))
            .and_then(Value::as_object)
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let mut record = IntentRecord {
            intent,
            trigger_type,
            services_needed: string_list(object.get("servicesNeeded").or_else(|| object.get("services_needed"))),
            data_flow,
            business_rules: string_list(object.get("businessRules").or_else(|| object.get("business_rules"))),
            custom_requirements,
            complexity,
            search_keywords: string_list(object.get("searchKeywords").or_else(|| object.get("search_keywords"))),
            similar_use_cases: string_list(object.get("similarUseCases").or_else(|| object.get("similar_use_cases"))),
        };
        record.enforce_invariants();
        Some(record)
    }

    /// Deduplicate services (keeping first occurrence), default an empty
    /// service list to the webhook service and cap the keyword list.
    pub fn enforce_invariants(&mut self) {
        let mut seen = Vec::with_capacity(self.services_needed.len());
        for service in self.services_needed.drain(..) {
            let service = service.trim().to_lowercase();
            if !service.is_empty() && !seen.contains(&service) {
                seen.push(service);
            }
        }
        if seen.is_empty() {
            seen.push(DEFAULT_SERVICE.to_string());
        }
        self.services_needed = seen;
        self.search_keywords.truncate(MAX_SEARCH_KEYWORDS);
    }

    /// Short name for a workflow built from this intent.
    pub fn workflow_name(&self) -> String {
        let words: Vec<&str> = self.intent.split_whitespace().take(6).collect();
        if words.is_empty() {
            return String::new();
        }
        let mut name = words.join(" ");
        if let Some(first) = name.get(..1) {
            name = format!("{}{}", first.to_uppercase(), &name[1..]);
        }
        name
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// One scored external search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance_score: u32,
}

impl ResearchResult {
    pub fn new(title: &str, url: &str, snippet: &str, relevance_score: u32) -> Self {
        ResearchResult {
            title: truncate_chars(title, MAX_TITLE_CHARS),
            url: url.to_string(),
            snippet: truncate_chars(snippet, MAX_SNIPPET_CHARS),
            relevance_score,
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
