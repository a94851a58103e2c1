use flex_protocol::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Concept node: one logical code construct as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Pre-order sequence number, unique within one graph
    pub id: String,

    /// Syntax discriminant the node was compiled from
    pub kind: String,

    /// Human-readable description, never empty
    pub label: String,

    /// Detected defect, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Always the origin; layout belongs to the renderer
    #[serde(default)]
    pub position: Position,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: label.into(),
            error,
            position: Position::default(),
        }
    }
}

/// Directed parent → child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e{source}-{target}"),
            source,
            target,
        }
    }
}

/// Raw node/edge lists, before normalization for the renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ConceptGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Decode a graph produced by a generative model.
    ///
    /// Accepts `{"nodes": [...], "edges": [...]}` with either flat
    /// (`label`, `error`) or renderer-shaped (`data.label`, `data.error`)
    /// nodes. Entries without an id (or edges without both endpoints) are
    /// skipped; the result is not required to be a tree.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let raw_nodes = value.get("nodes")?.as_array()?;

        let nodes = raw_nodes.iter().filter_map(decode_model_node).collect();
        let edges = value
            .get("edges")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().filter_map(decode_model_edge).collect())
            .unwrap_or_default();

        Some(Self { nodes, edges })
    }
}

fn decode_model_node(raw: &Value) -> Option<GraphNode> {
    let id = id_string(raw.get("id")?)?;
    let data = raw.get("data");
    let text_field = |field: &str| {
        raw.get(field)
            .or_else(|| data.and_then(|d| d.get(field)))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    let label = text_field("label").unwrap_or_else(|| id.clone());
    let kind = text_field("kind")
        .or_else(|| text_field("type"))
        .unwrap_or_else(|| "model".to_string());
    let error = text_field("error");

    Some(GraphNode::new(id, kind, label, error))
}

fn decode_model_edge(raw: &Value) -> Option<GraphEdge> {
    let source = id_string(raw.get("source")?)?;
    let target = id_string(raw.get("target")?)?;
    let mut edge = GraphEdge::between(source, target);
    if let Some(id) = raw.get("id").and_then(id_string) {
        edge.id = id;
    }
    Some(edge)
}

/// Models emit ids as strings or numbers interchangeably
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
