use flex_syntax::{parse_python, ComprehensionFlavor, Literal, SyntaxKind, SyntaxNode};
use pretty_assertions::assert_eq;

fn lower(code: &str) -> SyntaxNode {
    parse_python(code).expect("lowering failed")
}

fn kinds(nodes: &[SyntaxNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.kind.name()).collect()
}

#[test]
fn function_body_becomes_children() {
    let tree = lower("def add(a, b):\n    total = a + b\n    return total\n");

    let function = &tree.children[0];
    assert_eq!(
        function.kind,
        SyntaxKind::FunctionDef {
            name: "add".to_string(),
            is_async: false
        }
    );
    assert_eq!(function.line, 1);
    assert_eq!(kinds(&function.children), vec!["Assign", "Return"]);
}

#[test]
fn decorated_async_function_is_unwrapped() {
    let tree = lower("@cache\nasync def fetch():\n    pass\n");
    assert_eq!(
        tree.children[0].kind,
        SyntaxKind::FunctionDef {
            name: "fetch".to_string(),
            is_async: true
        }
    );
}

#[test]
fn elif_nests_inside_else_branch() {
    let code = "if x > 1:\n    a = 1\nelif x:\n    a = 2\nelse:\n    a = 3\n";
    let tree = lower(code);

    let outer = &tree.children[0];
    assert_eq!(kinds(&outer.children), vec!["Compare", "Assign", "If"]);

    let inner = &outer.children[2];
    assert!(matches!(&inner.kind, SyntaxKind::If { test } if test.text == "x"));
    assert_eq!(kinds(&inner.children), vec!["Assign", "Assign"]);
}

#[test]
fn literal_conditions_are_classified() {
    let tree = lower("if True:\n    pass\nwhile (False):\n    pass\n");
    match &tree.children[0].kind {
        SyntaxKind::If { test } => assert_eq!(test.literal, Some(Literal::Bool(true))),
        other => panic!("expected If, got {other:?}"),
    }
    match &tree.children[1].kind {
        SyntaxKind::While { test } => assert_eq!(test.literal, Some(Literal::Bool(false))),
        other => panic!("expected While, got {other:?}"),
    }
}

#[test]
fn chained_assignment_collects_all_targets() {
    let tree = lower("a = b = None\n");
    match &tree.children[0].kind {
        SyntaxKind::Assign { targets, value } => {
            let names: Vec<&str> = targets.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
            assert!(value.as_ref().is_some_and(|v| v.is_none_literal()));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn calls_nest_in_argument_order() {
    let tree = lower("print(len(items), sorted(x for x in items))\n");

    let outer = &tree.children[0];
    assert_eq!(
        outer.kind,
        SyntaxKind::Call {
            callee: "print".to_string()
        }
    );
    assert_eq!(kinds(&outer.children), vec!["Call", "Call"]);
    assert_eq!(
        outer.children[1].children[0].kind,
        SyntaxKind::Comprehension {
            flavor: ComprehensionFlavor::Generator
        }
    );
}

#[test]
fn comparison_keeps_operands_and_operators() {
    let tree = lower("result = 1 == 2\n");
    let compare = &tree.children[0].children[0];
    match &compare.kind {
        SyntaxKind::Compare {
            operands,
            operators,
        } => {
            assert_eq!(operators, &vec!["==".to_string()]);
            assert!(operands.iter().all(|o| o.literal == Some(Literal::Number)));
        }
        other => panic!("expected Compare, got {other:?}"),
    }
}

#[test]
fn try_block_lists_handlers_and_finally() {
    let code = "try:\n    run()\nexcept ValueError as err:\n    log(err)\nfinally:\n    close()\n";
    let tree = lower(code);

    let block = &tree.children[0];
    assert_eq!(kinds(&block.children), vec!["Call", "ExceptHandler", "Call"]);
    assert_eq!(
        block.children[1].kind,
        SyntaxKind::ExceptHandler {
            exception: Some("ValueError as err".to_string())
        }
    );
}

#[test]
fn docstring_and_ellipsis_are_placeholders() {
    let tree = lower("class Empty:\n    \"\"\"Nothing here.\"\"\"\n    ...\n");
    let class = &tree.children[0];
    assert_eq!(class.children.len(), 2);
    assert!(class.children.iter().all(SyntaxNode::is_placeholder));
}

#[test]
fn fstrings_are_not_literals() {
    let tree = lower("x = f\"{name}\"\n");
    match &tree.children[0].kind {
        SyntaxKind::Assign { value, .. } => {
            assert_eq!(value.as_ref().and_then(|v| v.literal), None);
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn unmodelled_statements_keep_their_grammar_kind() {
    let tree = lower("global counter\nassert check(x)\n");
    assert_eq!(kinds(&tree.children), vec!["global_statement", "assert_statement"]);
    assert_eq!(kinds(&tree.children[1].children), vec!["Call"]);
}

#[test]
fn comments_are_skipped() {
    let tree = lower("# leading\nx = 1  # trailing\n");
    assert_eq!(kinds(&tree.children), vec!["Assign"]);
}
