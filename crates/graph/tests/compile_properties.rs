use flex_graph::{compile, ConceptGraph};
use flex_syntax::{ComprehensionFlavor, Expr, Literal, SyntaxKind, SyntaxNode};
use proptest::prelude::*;
use std::collections::HashSet;

fn name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

fn expr() -> impl Strategy<Value = Expr> {
    prop_oneof![
        name().prop_map(Expr::new),
        Just(Expr::literal("True", Literal::Bool(true))),
        Just(Expr::literal("None", Literal::None)),
        Just(Expr::literal("42", Literal::Number)),
    ]
}

fn statement_kind() -> impl Strategy<Value = SyntaxKind> {
    prop_oneof![
        (name(), any::<bool>()).prop_map(|(name, is_async)| SyntaxKind::FunctionDef { name, is_async }),
        name().prop_map(|name| SyntaxKind::ClassDef { name }),
        (expr(), expr()).prop_map(|(target, iter)| SyntaxKind::For { target, iter }),
        expr().prop_map(|test| SyntaxKind::If { test }),
        expr().prop_map(|test| SyntaxKind::While { test }),
        (expr(), expr()).prop_map(|(t, v)| SyntaxKind::Assign {
            targets: vec![t],
            value: Some(v)
        }),
        proptest::option::of(expr()).prop_map(|value| SyntaxKind::Return { value }),
        Just(SyntaxKind::Try),
        Just(SyntaxKind::Pass),
    ]
}

fn expression_kind() -> impl Strategy<Value = SyntaxKind> {
    prop_oneof![
        name().prop_map(|callee| SyntaxKind::Call { callee }),
        (expr(), expr()).prop_map(|(a, b)| SyntaxKind::Compare {
            operands: vec![a, b],
            operators: vec!["==".to_string()]
        }),
        Just(SyntaxKind::ExceptHandler { exception: None }),
        Just(SyntaxKind::Comprehension {
            flavor: ComprehensionFlavor::Set
        }),
        Just(SyntaxKind::Lambda),
        "[a-z_]{0,12}".prop_map(SyntaxKind::other),
    ]
}

fn kind() -> impl Strategy<Value = SyntaxKind> {
    prop_oneof![statement_kind(), expression_kind()]
}

fn tree() -> impl Strategy<Value = SyntaxNode> {
    kind().prop_map(SyntaxNode::new).prop_recursive(5, 64, 6, |inner| {
        (kind(), prop::collection::vec(inner, 0..6))
            .prop_map(|(kind, children)| SyntaxNode::new(kind).with_children(children))
    })
}

fn assert_tree_shape(graph: &ConceptGraph, expected_nodes: usize) -> Result<(), TestCaseError> {
    prop_assert_eq!(graph.node_count(), expected_nodes);
    prop_assert_eq!(graph.edge_count(), expected_nodes - 1);
    prop_assert_eq!(graph.nodes[0].id.as_str(), "0");

    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    prop_assert_eq!(ids.len(), expected_nodes);
    prop_assert!(graph.is_tree());
    Ok(())
}

proptest! {
    #[test]
    fn compiled_graph_is_a_tree(root in tree()) {
        let graph = compile(&root);
        assert_tree_shape(&graph, root.subtree_len())?;
    }

    #[test]
    fn every_label_is_non_empty(root in tree()) {
        let graph = compile(&root);
        for node in &graph.nodes {
            prop_assert!(!node.label.trim().is_empty(), "empty label on {:?}", node);
        }
    }

    #[test]
    fn compilation_is_deterministic(root in tree()) {
        let first = serde_json::to_string(&compile(&root).normalize(None)).unwrap();
        let second = serde_json::to_string(&compile(&root).normalize(None)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn positions_start_at_origin(root in tree()) {
        let flow = compile(&root).normalize(None);
        for node in &flow.nodes {
            prop_assert_eq!(node.position.x, 0.0);
            prop_assert_eq!(node.position.y, 0.0);
        }
    }
}
