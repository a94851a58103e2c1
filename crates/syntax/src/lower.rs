use crate::tree::{ComprehensionFlavor, Expr, Literal, SyntaxKind, SyntaxNode};
use tree_sitter::Node;

/// Lowers a tree-sitter Python tree into [`SyntaxNode`]s.
///
/// Statements always become nodes. Inside expressions only calls,
/// comparisons, lambdas and comprehensions become nodes; everything else is
/// folded into the [`Expr`] text of the enclosing construct.
pub(crate) struct Lowering<'src> {
    source: &'src str,
}

impl<'src> Lowering<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self { source }
    }

    pub(crate) fn module(&self, root: Node) -> SyntaxNode {
        SyntaxNode::new(SyntaxKind::Module)
            .at_line(1)
            .with_children(self.statements(root))
    }

    fn statements(&self, block: Node) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        for child in named_children(block) {
            self.statement(child, &mut out);
        }
        out
    }

    fn statement(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        let lowered = match node.kind() {
            "function_definition" => self.function(node),
            "class_definition" => self.class(node),
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.statement(definition, out);
                }
                return;
            }
            "if_statement" => self.conditional(node),
            "for_statement" => self.for_loop(node),
            "while_statement" => self.while_loop(node),
            "try_statement" => self.try_block(node),
            "with_statement" => self.with_block(node),
            "return_statement" => self.return_statement(node),
            "expression_statement" => {
                self.expression_statement(node, out);
                return;
            }
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                SyntaxNode::new(SyntaxKind::Import {
                    text: self.text(node),
                })
            }
            "raise_statement" => {
                let exception = named_children(node).first().map(|n| self.text(*n));
                let mut children = Vec::new();
                for child in named_children(node) {
                    self.collect_expressions(child, &mut children);
                }
                SyntaxNode::new(SyntaxKind::Raise { exception }).with_children(children)
            }
            "pass_statement" => SyntaxNode::new(SyntaxKind::Pass),
            "block" => {
                out.extend(self.statements(node));
                return;
            }
            other => {
                let mut children = Vec::new();
                for child in named_children(node) {
                    if child.kind() == "block" {
                        children.extend(self.statements(child));
                    } else {
                        self.collect_expressions(child, &mut children);
                    }
                }
                SyntaxNode::new(SyntaxKind::other(other)).with_children(children)
            }
        };

        out.push(lowered.at_line(line_of(node)));
    }

    fn function(&self, node: Node) -> SyntaxNode {
        let name = self.field_text(node, "name").unwrap_or_default();
        let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
        SyntaxNode::new(SyntaxKind::FunctionDef { name, is_async })
            .with_children(self.field_statements(node, "body"))
    }

    fn class(&self, node: Node) -> SyntaxNode {
        let name = self.field_text(node, "name").unwrap_or_default();
        SyntaxNode::new(SyntaxKind::ClassDef { name })
            .with_children(self.field_statements(node, "body"))
    }

    fn conditional(&self, node: Node) -> SyntaxNode {
        let mut cursor = node.walk();
        let alternatives: Vec<Node> = node
            .children_by_field_name("alternative", &mut cursor)
            .collect();
        self.if_branch(node, &alternatives)
    }

    /// Builds an `If` from an `if_statement` or `elif_clause`; later `elif`s
    /// nest inside the else branch.
    fn if_branch(&self, node: Node, alternatives: &[Node]) -> SyntaxNode {
        let condition = node.child_by_field_name("condition");
        let test = condition.map_or_else(|| Expr::new(""), |c| self.expr(c));

        let mut children = Vec::new();
        if let Some(condition) = condition {
            self.collect_expressions(condition, &mut children);
        }
        children.extend(self.field_statements(node, "consequence"));

        if let Some((first, rest)) = alternatives.split_first() {
            match first.kind() {
                "elif_clause" => children.push(self.if_branch(*first, rest).at_line(line_of(*first))),
                "else_clause" => children.extend(self.field_statements(*first, "body")),
                _ => {}
            }
        }

        SyntaxNode::new(SyntaxKind::If { test }).with_children(children)
    }

    fn for_loop(&self, node: Node) -> SyntaxNode {
        let target = self.field_expr(node, "left");
        let iter = self.field_expr(node, "right");

        let mut children = Vec::new();
        if let Some(right) = node.child_by_field_name("right") {
            self.collect_expressions(right, &mut children);
        }
        children.extend(self.field_statements(node, "body"));
        if let Some(alternative) = node.child_by_field_name("alternative") {
            children.extend(self.field_statements(alternative, "body"));
        }

        SyntaxNode::new(SyntaxKind::For { target, iter }).with_children(children)
    }

    fn while_loop(&self, node: Node) -> SyntaxNode {
        let test = self.field_expr(node, "condition");

        let mut children = Vec::new();
        if let Some(condition) = node.child_by_field_name("condition") {
            self.collect_expressions(condition, &mut children);
        }
        children.extend(self.field_statements(node, "body"));
        if let Some(alternative) = node.child_by_field_name("alternative") {
            children.extend(self.field_statements(alternative, "body"));
        }

        SyntaxNode::new(SyntaxKind::While { test }).with_children(children)
    }

    fn try_block(&self, node: Node) -> SyntaxNode {
        let mut children = self.field_statements(node, "body");

        for clause in named_children(node) {
            match clause.kind() {
                "except_clause" | "except_group_clause" => {
                    children.push(self.except_handler(clause));
                }
                "else_clause" => children.extend(self.field_statements(clause, "body")),
                "finally_clause" => {
                    for block in named_children(clause) {
                        if block.kind() == "block" {
                            children.extend(self.statements(block));
                        }
                    }
                }
                _ => {}
            }
        }

        SyntaxNode::new(SyntaxKind::Try).with_children(children)
    }

    fn except_handler(&self, clause: Node) -> SyntaxNode {
        let parts = named_children(clause);
        let header: Vec<Node> = parts
            .iter()
            .copied()
            .filter(|part| part.kind() != "block")
            .collect();

        let exception = match (header.first(), header.last()) {
            (Some(first), Some(last)) => self
                .source
                .get(first.start_byte()..last.end_byte())
                .map(normalize_whitespace),
            _ => None,
        };

        let body = parts
            .iter()
            .filter(|part| part.kind() == "block")
            .flat_map(|block| self.statements(*block));

        SyntaxNode::new(SyntaxKind::ExceptHandler { exception })
            .at_line(line_of(clause))
            .with_children(body)
    }

    fn with_block(&self, node: Node) -> SyntaxNode {
        let mut items = String::new();
        let mut children = Vec::new();
        for part in named_children(node) {
            if part.kind() == "with_clause" {
                items = self.text(part);
                self.collect_expressions(part, &mut children);
            }
        }
        children.extend(self.field_statements(node, "body"));

        SyntaxNode::new(SyntaxKind::With { items }).with_children(children)
    }

    fn return_statement(&self, node: Node) -> SyntaxNode {
        let returned = named_children(node).into_iter().next();
        let value = returned.map(|n| self.expr(n));

        let mut children = Vec::new();
        if let Some(returned) = returned {
            self.collect_expressions(returned, &mut children);
        }

        SyntaxNode::new(SyntaxKind::Return { value }).with_children(children)
    }

    fn expression_statement(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        for child in named_children(node) {
            let line = line_of(child);
            match child.kind() {
                "assignment" => out.push(self.assignment(child).at_line(line)),
                "augmented_assignment" => out.push(self.augmented_assignment(child).at_line(line)),
                _ => {
                    let mut found = Vec::new();
                    self.collect_expressions(child, &mut found);
                    if found.is_empty() {
                        let value = self.expr(child);
                        out.push(SyntaxNode::new(SyntaxKind::Expr { value }).at_line(line));
                    } else {
                        out.extend(found);
                    }
                }
            }
        }
    }

    fn assignment(&self, node: Node) -> SyntaxNode {
        // `a = b = value` nests assignments on the right-hand side.
        let mut targets = Vec::new();
        let mut current = node;
        let right = loop {
            if let Some(left) = current.child_by_field_name("left") {
                targets.push(self.expr(left));
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                right => break right,
            }
        };

        let mut children = Vec::new();
        if let Some(right) = right {
            self.collect_expressions(right, &mut children);
        }

        SyntaxNode::new(SyntaxKind::Assign {
            targets,
            value: right.map(|r| self.expr(r)),
        })
        .with_children(children)
    }

    fn augmented_assignment(&self, node: Node) -> SyntaxNode {
        let target = self.field_expr(node, "left");
        let op = self.field_text(node, "operator").unwrap_or_default();
        let value = self.field_expr(node, "right");

        let mut children = Vec::new();
        if let Some(right) = node.child_by_field_name("right") {
            self.collect_expressions(right, &mut children);
        }

        SyntaxNode::new(SyntaxKind::AugAssign { target, op, value }).with_children(children)
    }

    /// Pushes the concept-bearing expressions found in `node` (the node
    /// itself included) in source order.
    fn collect_expressions(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        let lowered = match node.kind() {
            "call" => {
                let callee = self.field_text(node, "function").unwrap_or_default();
                let mut children = Vec::new();
                if let Some(function) = node.child_by_field_name("function") {
                    self.collect_nested(function, &mut children);
                }
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    self.collect_expressions(arguments, &mut children);
                }
                SyntaxNode::new(SyntaxKind::Call { callee }).with_children(children)
            }
            "comparison_operator" => {
                let operands = named_children(node);
                let mut cursor = node.walk();
                let operators = node
                    .children_by_field_name("operators", &mut cursor)
                    .map(|op| self.text(op))
                    .collect();

                let mut children = Vec::new();
                for operand in &operands {
                    self.collect_expressions(*operand, &mut children);
                }
                SyntaxNode::new(SyntaxKind::Compare {
                    operands: operands.iter().map(|o| self.expr(*o)).collect(),
                    operators,
                })
                .with_children(children)
            }
            "lambda" => {
                let mut children = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    self.collect_expressions(body, &mut children);
                }
                SyntaxNode::new(SyntaxKind::Lambda).with_children(children)
            }
            "list_comprehension" | "dictionary_comprehension" | "set_comprehension"
            | "generator_expression" => {
                let flavor = match node.kind() {
                    "list_comprehension" => ComprehensionFlavor::List,
                    "dictionary_comprehension" => ComprehensionFlavor::Dict,
                    "set_comprehension" => ComprehensionFlavor::Set,
                    _ => ComprehensionFlavor::Generator,
                };
                let mut children = Vec::new();
                self.collect_nested(node, &mut children);
                SyntaxNode::new(SyntaxKind::Comprehension { flavor }).with_children(children)
            }
            _ => {
                self.collect_nested(node, out);
                return;
            }
        };

        out.push(lowered.at_line(line_of(node)));
    }

    fn collect_nested(&self, node: Node, out: &mut Vec<SyntaxNode>) {
        for child in named_children(node) {
            self.collect_expressions(child, out);
        }
    }

    fn expr(&self, node: Node) -> Expr {
        Expr {
            text: self.text(node),
            literal: classify_literal(node),
        }
    }

    fn field_expr(&self, node: Node, field: &str) -> Expr {
        node.child_by_field_name(field)
            .map_or_else(|| Expr::new(""), |child| self.expr(child))
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|child| self.text(child))
    }

    fn field_statements(&self, node: Node, field: &str) -> Vec<SyntaxNode> {
        node.child_by_field_name(field)
            .map(|block| self.statements(block))
            .unwrap_or_default()
    }

    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source.as_bytes())
            .map(normalize_whitespace)
            .unwrap_or_default()
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn classify_literal(node: Node) -> Option<Literal> {
    match node.kind() {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        "none" => Some(Literal::None),
        "integer" | "float" => Some(Literal::Number),
        "ellipsis" => Some(Literal::Ellipsis),
        "string" => {
            let interpolated = named_children(node)
                .iter()
                .any(|part| part.kind() == "interpolation");
            (!interpolated).then_some(Literal::Str)
        }
        "concatenated_string" => named_children(node)
            .iter()
            .all(|part| classify_literal(*part) == Some(Literal::Str))
            .then_some(Literal::Str),
        "parenthesized_expression" => match named_children(node).as_slice() {
            [inner] => classify_literal(*inner),
            _ => None,
        },
        "unary_operator" => node
            .child_by_field_name("argument")
            .and_then(classify_literal)
            .filter(|literal| *literal == Literal::Number),
        _ => None,
    }
}
