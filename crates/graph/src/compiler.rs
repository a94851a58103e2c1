use crate::config::CompilerConfig;
use crate::error::Result;
use crate::heuristics::{HeuristicsEngine, TraversalContext};
use crate::labels::label_for;
use crate::types::{ConceptGraph, GraphEdge, GraphNode};
use flex_syntax::{parse_python, SyntaxNode};

/// Compiles a lowered syntax tree into a concept graph.
///
/// Every syntax node becomes exactly one graph node, numbered in pre-order
/// starting at `"0"` for the root, and every non-root node gets one edge
/// from its parent. Compilation never fails and is deterministic.
#[derive(Debug, Clone, Default)]
pub struct GraphCompiler {
    config: CompilerConfig,
    heuristics: HeuristicsEngine,
}

impl GraphCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            heuristics: HeuristicsEngine::default(),
        }
    }

    /// Replace the defect rules
    #[must_use]
    pub fn with_heuristics(mut self, heuristics: HeuristicsEngine) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn compile(&self, root: &SyntaxNode) -> ConceptGraph {
        let mut graph = ConceptGraph {
            nodes: Vec::with_capacity(root.subtree_len()),
            edges: Vec::new(),
        };
        let mut ancestors: Vec<String> = Vec::new();

        self.visit(
            root,
            TraversalContext::new(&self.config),
            &mut ancestors,
            &mut graph,
        );

        log::debug!(
            "Compiled concept graph: {} nodes, {} edges, {} defects",
            graph.node_count(),
            graph.edge_count(),
            graph.defects().len()
        );

        graph
    }

    fn visit<'a>(
        &'a self,
        node: &'a SyntaxNode,
        context: TraversalContext<'a>,
        ancestors: &mut Vec<String>,
        graph: &mut ConceptGraph,
    ) {
        let id = graph.nodes.len().to_string();
        let label = label_for(&node.kind, &self.config);
        let error = self.heuristics.detect(node, &context);

        graph
            .nodes
            .push(GraphNode::new(id.clone(), node.kind.name(), label, error));

        if let Some(parent) = ancestors.last() {
            graph.edges.push(GraphEdge::between(parent.clone(), id.clone()));
        }

        ancestors.push(id);
        let inner = context.entering(node);
        for child in &node.children {
            self.visit(child, inner, ancestors, graph);
        }
        ancestors.pop();
    }

    /// Parse Python source and compile it
    pub fn compile_source(&self, source: &str) -> Result<ConceptGraph> {
        let tree = parse_python(source)?;
        Ok(self.compile(&tree))
    }
}

/// Compile with the default configuration and built-in rules
pub fn compile(root: &SyntaxNode) -> ConceptGraph {
    GraphCompiler::default().compile(root)
}
