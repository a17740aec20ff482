//! Repairs arbitrary generated JSON into a complete workflow document.

use super::extract::GeneratedOutput;
use super::fallback::{blank_document, FallbackBuilder};
use super::schema::{
    base_type, new_id, ConnectionLink, Connections, Node, NodeConnections,
    WorkflowDocument, WorkflowMeta, WorkflowSettings, DEFAULT_EXECUTION_ORDER, DEFAULT_POSITION,
    MAIN_CHANNEL, NO_OP_NODE_TYPE,
};
use crate::core::config::WorkflowDefaults;
use serde_json::{json, Map, Number, Value};
use std::collections::HashSet;

/// Total function from generated output to a structurally valid document.
///
/// Every rule only fills what is missing or mistyped, so normalizing an
/// already complete document changes nothing but `updatedAt`.
#[derive(Debug, Clone)]
pub struct Normalizer {
    defaults: WorkflowDefaults,
}

impl Normalizer {
    pub fn new(defaults: WorkflowDefaults) -> Self {
        Normalizer { defaults }
    }

    /// Name used when the document has none. Blank names are ignored.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.defaults.default_name = name;
        }
        self
    }

    pub fn defaults(&self) -> &WorkflowDefaults {
        &self.defaults
    }

    pub fn normalize(&self, output: GeneratedOutput) -> WorkflowDocument {
        match output {
            GeneratedOutput::Parsed(object) => self.normalize_object(object),
            GeneratedOutput::Unparsable => {
                tracing::debug!("generated output unparsable, using minimal workflow");
                FallbackBuilder::new(self.defaults.clone()).build_minimal()
            }
        }
    }

    pub fn normalize_text(&self, text: &str) -> WorkflowDocument {
        self.normalize(GeneratedOutput::from_text(text))
    }

    pub fn normalize_value(&self, value: Value) -> WorkflowDocument {
        self.normalize(GeneratedOutput::from_value(value))
    }

    fn normalize_object(&self, mut object: Map<String, Value>) -> WorkflowDocument {
        let mut document = blank_document(&self.defaults, &self.defaults.default_name);

        if let Some(meta) = take_object(&mut object, "meta") {
            document.meta = self.normalize_meta(meta);
        }
        if let Some(Value::Bool(active)) = object.remove("active") {
            document.active = active;
        }
        if let Some(created_at) = take_string(&mut object, "createdAt") {
            document.created_at = created_at;
        }
        // updatedAt is always the generation time.
        object.remove("updatedAt");
        if let Some(id) = take_string(&mut object, "id") {
            document.id = id;
        }
        if let Some(name) = take_string(&mut object, "name") {
            document.name = name;
        }
        if let Some(Value::Array(nodes)) = object.remove("nodes") {
            document.nodes = normalize_nodes(nodes);
        }
        if let Some(connections) = take_object(&mut object, "connections") {
            document.connections = normalize_connections(connections);
        }
        if let Some(pin_data) = take_object(&mut object, "pinData") {
            document.pin_data = pin_data;
        }
        if let Some(settings) = take_object(&mut object, "settings") {
            document.settings = normalize_settings(settings);
        }
        if let Some(static_data) = take_object(&mut object, "staticData") {
            document.static_data = static_data;
        }
        if let Some(Value::Array(tags)) = object.remove("tags") {
            document.tags = tags;
        }
        if let Some(trigger_count) = object.remove("triggerCount").as_ref().and_then(Value::as_u64) {
            document.trigger_count = trigger_count;
        }
        if let Some(version_id) = take_string(&mut object, "versionId") {
            document.version_id = version_id;
        }

        if document.nodes.iter().any(|node| node.id == document.id) {
            tracing::debug!(id = %document.id, "document id collides with a node id, replacing");
            document.id = new_id();
        }

        document.extra = object;
        document
    }

    fn normalize_meta(&self, mut meta: Map<String, Value>) -> WorkflowMeta {
        WorkflowMeta {
            template_created_by: take_string(&mut meta, "templateCreatedBy")
                .unwrap_or_else(|| self.defaults.template_created_by.clone()),
            instance_id: take_string(&mut meta, "instanceId").unwrap_or_else(new_id),
            extra: meta,
        }
    }
}

fn normalize_settings(mut settings: Map<String, Value>) -> WorkflowSettings {
    WorkflowSettings {
        execution_order: take_string(&mut settings, "executionOrder")
            .unwrap_or_else(|| DEFAULT_EXECUTION_ORDER.to_string()),
        extra: settings,
    }
}

fn normalize_nodes(nodes: Vec<Value>) -> Vec<Node> {
    let mut seen = HashSet::new();
    let mut names = HashSet::new();
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Value::Object(map) => {
                let mut node = normalize_node(map, &mut seen);
                node.name = unique_name(node.name, &mut names);
                Some(node)
            }
            other => {
                tracing::debug!(entry = %other, "dropping non-object node entry");
                None
            }
        })
        .collect()
}

/// Repeated names get the lowest free numeric suffix: `Slack`, `Slack1`, `Slack2`.
/// Connections naming the repeated node keep resolving to the first one.
fn unique_name(name: String, names: &mut HashSet<String>) -> String {
    if names.insert(name.clone()) {
        return name;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{}{}", name, n);
        if names.insert(candidate.clone()) {
            tracing::debug!(name = %name, renamed = %candidate, "renamed duplicate node");
            return candidate;
        }
        n += 1;
    }
}

fn normalize_node(mut map: Map<String, Value>, seen: &mut HashSet<String>) -> Node {
    let id = match map.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() && !seen.contains(&id) => id,
        Some(Value::Number(n)) if !seen.contains(&n.to_string()) => n.to_string(),
        _ => new_id(),
    };
    seen.insert(id.clone());

    let node_type = take_string(&mut map, "type").unwrap_or_else(|| NO_OP_NODE_TYPE.to_string());
    let name = take_string(&mut map, "name").unwrap_or_else(|| display_name(&node_type));

    let type_version = match map.remove("typeVersion") {
        Some(Value::Number(n)) => n,
        _ => Number::from(1),
    };

    let mut parameters = take_object(&mut map, "parameters").unwrap_or_default();
    apply_parameter_defaults(base_type(&node_type), &mut parameters);

    let position = match map.remove("position") {
        Some(Value::Array(items)) => match items.as_slice() {
            [Value::Number(x), Value::Number(y)] => [x.clone(), y.clone()],
            _ => default_position(),
        },
        _ => default_position(),
    };

    if base_type(&node_type) == "webhook" && !matches!(map.get("webhookId"), Some(Value::String(_))) {
        map.insert("webhookId".to_string(), Value::String(id.clone()));
    }

    Node {
        id,
        name,
        node_type,
        type_version,
        parameters,
        position,
        extra: map,
    }
}

fn default_position() -> [Number; 2] {
    [Number::from(DEFAULT_POSITION[0]), Number::from(DEFAULT_POSITION[1])]
}

/// Fill parameters the platform rejects a known node kind without.
fn apply_parameter_defaults(kind: &str, parameters: &mut Map<String, Value>) {
    let defaults = match kind {
        "webhook" => json!({
            "httpMethod": "POST",
            "path": "webhook",
            "responseMode": "onReceived",
        }),
        "googleSheets" => json!({ "operation": "appendOrUpdate" }),
        "gmail" => json!({ "operation": "send" }),
        "slack" => json!({
            "operation": "postMessage",
            "channel": "={{$env.SLACK_CHANNEL}}",
        }),
        "httpRequest" => json!({
            "method": "GET",
            "url": "={{$env.API_ENDPOINT}}",
        }),
        "cron" => json!({ "rule": { "hour": 9, "minute": 0 } }),
        "scheduleTrigger" => json!({
            "rule": { "interval": [{ "field": "days", "triggerAtHour": 9 }] }
        }),
        _ => return,
    };
    if let Value::Object(defaults) = defaults {
        for (key, value) in defaults {
            parameters.entry(key).or_insert(value);
        }
    }
}

fn normalize_connections(connections: Map<String, Value>) -> Connections {
    let mut normalized = Connections::new();
    for (source, channels) in connections {
        let Value::Object(channels) = channels else {
            tracing::debug!(source = %source, "dropping malformed connection entry");
            continue;
        };
        let mut node_connections = NodeConnections::new();
        for (channel, lanes) in channels {
            let Value::Array(lanes) = lanes else {
                continue;
            };
            let lanes = lanes
                .into_iter()
                .map(|lane| match lane {
                    Value::Array(links) => links.into_iter().filter_map(normalize_link).collect(),
                    _ => Vec::new(),
                })
                .collect();
            node_connections.insert(channel, lanes);
        }
        normalized.insert(source, node_connections);
    }
    normalized
}

fn normalize_link(link: Value) -> Option<ConnectionLink> {
    let Value::Object(mut link) = link else {
        return None;
    };
    let node = take_string(&mut link, "node")?;
    Some(ConnectionLink {
        node,
        link_type: take_string(&mut link, "type").unwrap_or_else(|| MAIN_CHANNEL.to_string()),
        index: link.get("index").and_then(Value::as_u64).unwrap_or(0),
    })
}

/// `n8n-nodes-base.googleSheets` becomes `Google Sheets`.
pub fn display_name(node_type: &str) -> String {
    let kind = base_type(node_type);
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in kind.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    if words.is_empty() {
        return "Node".to_string();
    }
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn take_object(map: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match map.remove(key) {
        Some(Value::Object(object)) => Some(object),
        _ => None,
    }
}
