use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const NODE_PREFIX: &str = "n8n-nodes-base.";
pub const WEBHOOK_NODE_TYPE: &str = "n8n-nodes-base.webhook";
pub const SET_NODE_TYPE: &str = "n8n-nodes-base.set";
pub const NO_OP_NODE_TYPE: &str = "n8n-nodes-base.noOp";
pub const MAIN_CHANNEL: &str = "main";
pub const DEFAULT_EXECUTION_ORDER: &str = "v1";
pub const DEFAULT_POSITION: [i64; 2] = [240, 300];

/// Outgoing links of one node, keyed by output channel ("main").
/// Each channel holds one list of links per output index.
pub type NodeConnections = IndexMap<String, Vec<Vec<ConnectionLink>>>;

/// Source node reference (id or name) to its outgoing links.
pub type Connections = IndexMap<String, NodeConnections>;

/// An importable workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub meta: WorkflowMeta,
    pub active: bool,
    pub connections: Connections,
    pub created_at: String,
    pub updated_at: String,
    pub id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    pub pin_data: Map<String, Value>,
    pub settings: WorkflowSettings,
    pub static_data: Map<String, Value>,
    pub tags: Vec<Value>,
    pub trigger_count: u64,
    pub version_id: String,
    /// Fields the platform understands but this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMeta {
    pub template_created_by: String,
    pub instance_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSettings {
    pub execution_order: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            execution_order: DEFAULT_EXECUTION_ORDER.to_string(),
            extra: Map::new(),
        }
    }
}

/// One workflow step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub type_version: Number,
    pub parameters: Map<String, Value>,
    pub position: [Number; 2],
    /// webhookId, credentials, disabled, notes and the like.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(name: &str, node_type: &str, parameters: Map<String, Value>, position: [i64; 2]) -> Self {
        Node {
            id: new_id(),
            name: name.to_string(),
            node_type: node_type.to_string(),
            type_version: Number::from(1),
            parameters,
            position: [Number::from(position[0]), Number::from(position[1])],
            extra: Map::new(),
        }
    }

    /// Node kind without the platform prefix, e.g. `googleSheets`.
    pub fn base_type(&self) -> &str {
        base_type(&self.node_type)
    }

    pub fn webhook_id(&self) -> Option<&str> {
        self.extra.get("webhookId").and_then(Value::as_str)
    }
}

/// Target end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionLink {
    pub node: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub index: u64,
}

impl ConnectionLink {
    pub fn main(node: &str) -> Self {
        ConnectionLink {
            node: node.to_string(),
            link_type: MAIN_CHANNEL.to_string(),
            index: 0,
        }
    }
}

impl WorkflowDocument {
    /// Look up a node by id first, then by display name.
    pub fn resolve_node(&self, reference: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.id == reference)
            .or_else(|| self.nodes.iter().find(|node| node.name == reference))
    }

    /// Iterate `(source reference, link)` pairs across every channel.
    pub fn links(&self) -> impl Iterator<Item = (&str, &ConnectionLink)> {
        self.connections.iter().flat_map(|(source, channels)| {
            channels
                .values()
                .flatten()
                .flatten()
                .map(move |link| (source.as_str(), link))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn base_type(node_type: &str) -> &str {
    node_type.strip_prefix(NODE_PREFIX).unwrap_or(node_type)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
