//! Renderer-facing wire schema.
//!
//! Field names and nesting of [`FlowGraph`] are consumed verbatim by the
//! frontend graph renderer and must not change.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display type tag attached to every rendered node
pub const DISPLAY_NODE_TYPE: &str = "default";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: NodeData,
    pub position: Position,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Out-of-band defect report keyed by node id
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorReport {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct HighLevelFeedback {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Explanation of a single node's construct
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct Explanation {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct AnalyzeRequest {
    pub code: String,
    /// Raw text of a generative model's review of `code`
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub graph: FlowGraph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_level_feedback: Option<HighLevelFeedback>,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct RecoverRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RecoverResponse {
    pub found: bool,
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ExplainRequest {
    #[serde(rename = "nodeLabel", alias = "node_label")]
    pub node_label: String,
    pub model_response: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ExplainResponse {
    pub node_label: String,
    pub explanation: Explanation,
    /// `explanation.description` as a flat string, for clients that only
    /// show prose
    pub text: String,
}

impl ExplainResponse {
    pub fn new(node_label: String, explanation: Explanation) -> Self {
        Self {
            node_label,
            text: explanation.description.clone(),
            explanation,
        }
    }
}

/// One persisted analysis
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct HistoryEntry {
    pub code: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn flow_graph_wire_shape() {
        let graph = FlowGraph {
            nodes: vec![
                FlowNode {
                    id: "0".to_string(),
                    node_type: DISPLAY_NODE_TYPE.to_string(),
                    data: NodeData {
                        label: "Module".to_string(),
                        error: None,
                    },
                    position: Position::default(),
                },
                FlowNode {
                    id: "1".to_string(),
                    node_type: DISPLAY_NODE_TYPE.to_string(),
                    data: NodeData {
                        label: "Function: f".to_string(),
                        error: Some("Function 'f' has an empty body.".to_string()),
                    },
                    position: Position::default(),
                },
            ],
            edges: vec![FlowEdge {
                id: "e0-1".to_string(),
                source: "0".to_string(),
                target: "1".to_string(),
            }],
        };

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(
            value,
            json!({
                "nodes": [
                    {"id": "0", "type": "default", "data": {"label": "Module"}, "position": {"x": 0.0, "y": 0.0}},
                    {"id": "1", "type": "default", "data": {"label": "Function: f", "error": "Function 'f' has an empty body."}, "position": {"x": 0.0, "y": 0.0}}
                ],
                "edges": [{"id": "e0-1", "source": "0", "target": "1"}]
            })
        );
    }

    #[test]
    fn analyze_response_flattens_graph() {
        let response = AnalyzeResponse {
            graph: FlowGraph::default(),
            high_level_feedback: None,
            hints: vec![],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"nodes": [], "edges": [], "hints": []}));
    }

    #[test]
    fn explain_response_carries_flat_text() {
        let response = ExplainResponse::new(
            "Call: fact".to_string(),
            Explanation {
                description: "Recurses on n.".to_string(),
                concepts: Some(vec!["recursion".to_string()]),
                ..Default::default()
            },
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "node_label": "Call: fact",
                "explanation": {"description": "Recurses on n.", "concepts": ["recursion"]},
                "text": "Recurses on n."
            })
        );
    }

    #[test]
    fn explain_request_accepts_camel_case_label() {
        let request: ExplainRequest =
            serde_json::from_value(json!({"nodeLabel": "For Loop over x", "model_response": "{}"}))
                .unwrap();
        assert_eq!(request.node_label, "For Loop over x");
    }
}
