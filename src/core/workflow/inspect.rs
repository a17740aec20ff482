use super::schema::{base_type, Node, WorkflowDocument};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

const TRIGGER_KINDS: &[&str] = &[
    "webhook",
    "cron",
    "manualTrigger",
    "emailTrigger",
    "fileTrigger",
    "intervalTrigger",
    "scheduleTrigger",
];

/// Nodes that start workflow execution.
pub fn is_trigger_node(node: &Node) -> bool {
    let kind = node.base_type();
    TRIGGER_KINDS.contains(&kind) || kind.ends_with("Trigger")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub name: String,
    pub total_nodes: usize,
    pub total_connections: usize,
    pub trigger_count: usize,
    /// Node kind (without platform prefix) to occurrence count.
    pub node_types: BTreeMap<String, usize>,
    pub has_valid_structure: bool,
}

impl WorkflowStats {
    pub fn collect(document: &WorkflowDocument) -> Self {
        let mut node_types = BTreeMap::new();
        for node in &document.nodes {
            *node_types.entry(base_type(&node.node_type).to_string()).or_insert(0) += 1;
        }
        let total_connections = document.links().count();
        WorkflowStats {
            name: document.name.clone(),
            total_nodes: document.nodes.len(),
            total_connections,
            trigger_count: document.nodes.iter().filter(|n| is_trigger_node(n)).count(),
            node_types,
            has_valid_structure: !document.nodes.is_empty()
                && (total_connections > 0 || document.nodes.len() == 1)
                && dangling_references(document).is_empty(),
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Workflow: {}\nNodes: {}\nConnections: {}\nTriggers: {}\n",
            self.name, self.total_nodes, self.total_connections, self.trigger_count
        );
        if !self.node_types.is_empty() {
            out.push_str("Node types:\n");
            for (kind, count) in &self.node_types {
                out.push_str(&format!("  - {}: {}\n", kind, count));
            }
        }
        out.push_str(&format!(
            "Importable: {}\n",
            if self.has_valid_structure { "yes" } else { "no" }
        ));
        out
    }
}

fn env_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{\{\s*\$env\.([A-Z_][A-Z0-9_]*)\s*\}\}").ok())
        .as_ref()
}

/// Environment variables referenced via `{{$env.NAME}}`, sorted.
pub fn required_env_vars(document: &WorkflowDocument) -> Vec<String> {
    let Some(pattern) = env_pattern() else {
        return Vec::new();
    };
    let Ok(text) = serde_json::to_string(&document.nodes) else {
        return Vec::new();
    };
    pattern
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Credentials the user must configure before activating the workflow.
pub fn suggest_credentials(document: &WorkflowDocument) -> Vec<String> {
    document
        .nodes
        .iter()
        .filter_map(|node| {
            let kind = node.node_type.as_str();
            if kind.contains("googleSheets") {
                Some("Google Sheets API")
            } else if kind.contains("gmail") {
                Some("Gmail API")
            } else if kind.contains("slack") {
                Some("Slack API")
            } else if kind.contains("httpRequest") {
                Some("HTTP Authentication")
            } else {
                None
            }
        })
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A connection end that matches no node id or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub source: String,
    pub target: Option<String>,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} -> {} (unknown target)", self.source, target),
            None => write!(f, "{} (unknown source)", self.source),
        }
    }
}

pub fn dangling_references(document: &WorkflowDocument) -> Vec<DanglingReference> {
    let mut out = Vec::new();
    for (source, channels) in &document.connections {
        if document.resolve_node(source).is_none() {
            out.push(DanglingReference {
                source: source.clone(),
                target: None,
            });
        }
        for link in channels.values().flatten().flatten() {
            if document.resolve_node(&link.node).is_none() {
                out.push(DanglingReference {
                    source: source.clone(),
                    target: Some(link.node.clone()),
                });
            }
        }
    }
    out
}

fn build_graph(document: &WorkflowDocument) -> (DiGraph<usize, ()>, Vec<NodeIndex>) {
    let mut graph = DiGraph::new();
    let indices: Vec<NodeIndex> = (0..document.nodes.len()).map(|i| graph.add_node(i)).collect();
    let position = |reference: &str| {
        document
            .nodes
            .iter()
            .position(|n| n.id == reference)
            .or_else(|| document.nodes.iter().position(|n| n.name == reference))
    };
    for (source, link) in document.links() {
        if let (Some(from), Some(to)) = (position(source), position(&link.node)) {
            graph.add_edge(indices[from], indices[to], ());
        }
    }
    (graph, indices)
}

/// Names of nodes no trigger can reach. Empty when there are no triggers.
pub fn unreachable_nodes(document: &WorkflowDocument) -> Vec<String> {
    let (graph, indices) = build_graph(document);
    let triggers: Vec<NodeIndex> = document
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| is_trigger_node(node))
        .map(|(i, _)| indices[i])
        .collect();
    if triggers.is_empty() {
        return Vec::new();
    }

    let mut reachable = HashSet::new();
    for start in triggers {
        let mut bfs = Bfs::new(&graph, start);
        while let Some(nx) = bfs.next(&graph) {
            reachable.insert(nx);
        }
    }

    document
        .nodes
        .iter()
        .zip(&indices)
        .filter(|(_, nx)| !reachable.contains(*nx))
        .map(|(node, _)| node.name.clone())
        .collect()
}

/// Everything `inspect` reports about a document.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub stats: WorkflowStats,
    pub required_env_vars: Vec<String>,
    pub credentials: Vec<String>,
    pub dangling_references: Vec<DanglingReference>,
    pub unreachable_nodes: Vec<String>,
}

impl InspectionReport {
    pub fn build(document: &WorkflowDocument) -> Self {
        InspectionReport {
            stats: WorkflowStats::collect(document),
            required_env_vars: required_env_vars(document),
            credentials: suggest_credentials(document),
            dangling_references: dangling_references(document),
            unreachable_nodes: unreachable_nodes(document),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self.stats.summary();
        let sections: [(&str, Vec<String>); 4] = [
            ("Environment variables", self.required_env_vars.clone()),
            ("Credentials", self.credentials.clone()),
            (
                "Dangling references",
                self.dangling_references.iter().map(ToString::to_string).collect(),
            ),
            ("Unreachable nodes", self.unreachable_nodes.clone()),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("{}:\n", title));
            for item in items {
                out.push_str(&format!("  - {}\n", item));
            }
        }
        out
    }
}
