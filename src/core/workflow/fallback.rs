use super::schema::{
    new_id, now_timestamp, ConnectionLink, Connections, Node, NodeConnections, WorkflowDocument,
    WorkflowMeta, WorkflowSettings, MAIN_CHANNEL, SET_NODE_TYPE, WEBHOOK_NODE_TYPE,
};
use crate::core::config::WorkflowDefaults;
use serde_json::{json, Map, Value};

pub const FALLBACK_WEBHOOK_PATH: &str = "automation";
pub const FALLBACK_TIMESTAMP_EXPRESSION: &str = "={{ $now.toISO() }}";

/// Builds the canonical minimal workflow used whenever generation fails.
#[derive(Debug, Clone)]
pub struct FallbackBuilder {
    defaults: WorkflowDefaults,
}

impl FallbackBuilder {
    pub fn new(defaults: WorkflowDefaults) -> Self {
        FallbackBuilder { defaults }
    }

    /// Webhook trigger (POST) wired on `main`/0 to a set node stamping the
    /// current time. Every call yields fresh ids.
    pub fn build_minimal(&self) -> WorkflowDocument {
        self.build_named(&self.defaults.default_name)
    }

    pub fn build_named(&self, name: &str) -> WorkflowDocument {
        let mut trigger = Node::new(
            "Webhook Trigger",
            WEBHOOK_NODE_TYPE,
            json_object(json!({
                "httpMethod": "POST",
                "path": FALLBACK_WEBHOOK_PATH,
                "responseMode": "onReceived",
            })),
            [240, 300],
        );
        trigger
            .extra
            .insert("webhookId".to_string(), Value::String(trigger.id.clone()));

        let processor = Node::new(
            "Set Timestamp",
            SET_NODE_TYPE,
            json_object(json!({
                "values": {
                    "string": [
                        { "name": "timestamp", "value": FALLBACK_TIMESTAMP_EXPRESSION }
                    ]
                },
                "options": {},
            })),
            [460, 300],
        );

        let mut channels = NodeConnections::new();
        channels.insert(
            MAIN_CHANNEL.to_string(),
            vec![vec![ConnectionLink::main(&processor.id)]],
        );
        let mut connections = Connections::new();
        connections.insert(trigger.id.clone(), channels);

        let mut document = blank_document(&self.defaults, name);
        document.nodes = vec![trigger, processor];
        document.connections = connections;
        document
    }
}

/// A document with every top-level field at its default value.
pub fn blank_document(defaults: &WorkflowDefaults, name: &str) -> WorkflowDocument {
    let now = now_timestamp();
    WorkflowDocument {
        meta: WorkflowMeta {
            template_created_by: defaults.template_created_by.clone(),
            instance_id: new_id(),
            extra: Map::new(),
        },
        active: true,
        connections: Connections::new(),
        created_at: now.clone(),
        updated_at: now,
        id: new_id(),
        name: name.to_string(),
        nodes: Vec::new(),
        pin_data: Map::new(),
        settings: WorkflowSettings::default(),
        static_data: Map::new(),
        tags: Vec::new(),
        trigger_count: 1,
        version_id: new_id(),
        extra: Map::new(),
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
