use crate::types::{ConceptGraph, GraphEdge, GraphNode};
use flex_protocol::{
    ErrorReport, FlowEdge, FlowGraph, FlowNode, NodeData, Position, DISPLAY_NODE_TYPE,
};
use std::collections::HashMap;

/// Reshape raw nodes and edges into the renderer schema, merging external
/// defect reports into the nodes they name.
///
/// Reports whose id matches no node are dropped. When the matched node
/// already carries an error, the report is appended after it. Duplicate node
/// ids (possible in model-sourced graphs) resolve to the first occurrence.
pub fn normalize(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    external_errors: Option<&[ErrorReport]>,
) -> FlowGraph {
    let mut flow_nodes: Vec<FlowNode> = nodes.iter().map(flow_node).collect();

    if let Some(reports) = external_errors {
        merge_reports(&mut flow_nodes, reports);
    }

    let flow_edges = edges
        .iter()
        .map(|edge| FlowEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        })
        .collect();

    FlowGraph {
        nodes: flow_nodes,
        edges: flow_edges,
    }
}

fn flow_node(node: &GraphNode) -> FlowNode {
    FlowNode {
        id: node.id.clone(),
        node_type: DISPLAY_NODE_TYPE.to_string(),
        data: NodeData {
            label: node.label.clone(),
            error: node.error.clone(),
        },
        position: Position::default(),
    }
}

fn merge_reports(nodes: &mut [FlowNode], reports: &[ErrorReport]) {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        index.entry(node.id.clone()).or_insert(idx);
    }

    for report in reports {
        let description = report.description.trim();
        if description.is_empty() {
            continue;
        }

        let Some(&idx) = index.get(report.id.trim()) else {
            log::debug!("Dropping defect report for unknown node id {:?}", report.id);
            continue;
        };

        let slot = &mut nodes[idx].data.error;
        *slot = Some(match slot.take() {
            Some(existing) => format!("{existing} {description}"),
            None => description.to_string(),
        });
    }
}

impl ConceptGraph {
    /// See [`normalize`]
    pub fn normalize(&self, external_errors: Option<&[ErrorReport]>) -> FlowGraph {
        normalize(&self.nodes, &self.edges, external_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ConceptGraph {
        ConceptGraph {
            nodes: vec![
                GraphNode::new("0", "Module", "Module", None),
                GraphNode::new(
                    "1",
                    "FunctionDef",
                    "Function: foo",
                    Some("Function 'foo' has an empty body.".into()),
                ),
            ],
            edges: vec![GraphEdge::between("0", "1")],
        }
    }

    fn report(id: &str, description: &str) -> ErrorReport {
        ErrorReport {
            id: id.into(),
            description: description.into(),
        }
    }

    #[test]
    fn renderer_schema_shape() {
        let flow = sample().normalize(None);
        assert_eq!(
            serde_json::to_value(&flow).unwrap(),
            json!({
                "nodes": [
                    {"id": "0", "type": "default", "data": {"label": "Module"}, "position": {"x": 0.0, "y": 0.0}},
                    {"id": "1", "type": "default",
                     "data": {"label": "Function: foo", "error": "Function 'foo' has an empty body."},
                     "position": {"x": 0.0, "y": 0.0}}
                ],
                "edges": [{"id": "e0-1", "source": "0", "target": "1"}]
            })
        );
    }

    #[test]
    fn reports_merge_by_id() {
        let flow = sample().normalize(Some(&[
            report("0", "Module has no docstring."),
            report("1", "Consider removing it."),
        ]));
        assert_eq!(
            flow.nodes[0].data.error.as_deref(),
            Some("Module has no docstring.")
        );
        assert_eq!(
            flow.nodes[1].data.error.as_deref(),
            Some("Function 'foo' has an empty body. Consider removing it.")
        );
    }

    #[test]
    fn unknown_ids_change_nothing() {
        let graph = sample();
        let merged = graph.normalize(Some(&[report("2", "x")]));
        assert_eq!(merged, graph.normalize(None));
    }

    #[test]
    fn duplicate_ids_merge_into_first() {
        let graph = ConceptGraph {
            nodes: vec![
                GraphNode::new("7", "model", "A", None),
                GraphNode::new("7", "model", "B", None),
            ],
            edges: Vec::new(),
        };
        let flow = graph.normalize(Some(&[report("7", "Dead code.")]));
        assert_eq!(flow.nodes[0].data.error.as_deref(), Some("Dead code."));
        assert_eq!(flow.nodes[1].data.error, None);
    }

    #[test]
    fn blank_descriptions_are_ignored() {
        let flow = sample().normalize(Some(&[report("0", "   ")]));
        assert_eq!(flow.nodes[0].data.error, None);
    }
}
