//! Single-node defect heuristics.
//!
//! Each [`Rule`] looks at one syntax node plus the [`TraversalContext`] and
//! either reports a defect sentence or stays silent. Rules are evaluated in
//! order and the first report wins. These are shallow pattern checks, not
//! data-flow analysis.

use crate::config::CompilerConfig;
use flex_syntax::{SyntaxKind, SyntaxNode};
use std::fmt;

/// What the traversal knows about a node's surroundings
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'a> {
    /// Name of the nearest enclosing function definition
    pub enclosing_function: Option<&'a str>,

    pub config: &'a CompilerConfig,
}

impl<'a> TraversalContext<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self {
            enclosing_function: None,
            config,
        }
    }

    /// Context for the children of `node`
    pub fn entering(self, node: &'a SyntaxNode) -> Self {
        match &node.kind {
            SyntaxKind::FunctionDef { name, .. } => Self {
                enclosing_function: Some(name.as_str()),
                ..self
            },
            _ => self,
        }
    }
}

pub type RuleCheck = fn(&SyntaxNode, &TraversalContext<'_>) -> Option<String>;

/// A named defect check
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: RuleCheck,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Built-in rules in evaluation order
pub const BUILTIN_RULES: [Rule; 7] = [
    Rule {
        name: "empty_body",
        check: empty_body,
    },
    Rule {
        name: "bare_return",
        check: bare_return,
    },
    Rule {
        name: "recursive_call",
        check: recursive_call,
    },
    Rule {
        name: "constant_condition",
        check: constant_condition,
    },
    Rule {
        name: "constant_comparison",
        check: constant_comparison,
    },
    Rule {
        name: "none_assignment",
        check: none_assignment,
    },
    Rule {
        name: "handlerless_try",
        check: handlerless_try,
    },
];

/// Ordered rule list; the first rule that reports wins
#[derive(Debug, Clone)]
pub struct HeuristicsEngine {
    rules: Vec<Rule>,
}

impl Default for HeuristicsEngine {
    fn default() -> Self {
        Self::new(BUILTIN_RULES.to_vec())
    }
}

impl HeuristicsEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }

    pub fn detect(&self, node: &SyntaxNode, context: &TraversalContext<'_>) -> Option<String> {
        self.rules.iter().find_map(|rule| (rule.check)(node, context))
    }
}

fn empty_body(node: &SyntaxNode, context: &TraversalContext<'_>) -> Option<String> {
    let (what, name) = match &node.kind {
        SyntaxKind::FunctionDef { name, .. } => ("Function", name),
        SyntaxKind::ClassDef { name } => ("Class", name),
        _ => return None,
    };

    let empty = node.children.is_empty()
        || (context.config.placeholder_bodies_are_empty
            && node.children.iter().all(SyntaxNode::is_placeholder));

    empty.then(|| format!("{what} '{name}' has an empty body."))
}

fn bare_return(node: &SyntaxNode, context: &TraversalContext<'_>) -> Option<String> {
    match (&node.kind, context.enclosing_function) {
        (SyntaxKind::Return { value: None }, Some(function)) => {
            Some(format!("Function '{function}' returns without a value."))
        }
        _ => None,
    }
}

fn recursive_call(node: &SyntaxNode, context: &TraversalContext<'_>) -> Option<String> {
    match (&node.kind, context.enclosing_function) {
        (SyntaxKind::Call { callee }, Some(function)) if callee == function => Some(format!(
            "Recursive call detected: '{function}' calls itself."
        )),
        _ => None,
    }
}

fn constant_condition(node: &SyntaxNode, _context: &TraversalContext<'_>) -> Option<String> {
    match &node.kind {
        SyntaxKind::If { test } => test
            .as_bool()
            .map(|value| format!("Condition is always {value}.")),
        _ => None,
    }
}

fn constant_comparison(node: &SyntaxNode, _context: &TraversalContext<'_>) -> Option<String> {
    match &node.kind {
        SyntaxKind::Compare { operands, .. }
            if operands.len() >= 2 && operands.iter().all(|o| o.is_literal()) =>
        {
            Some("Comparison between two constants.".to_string())
        }
        _ => None,
    }
}

fn none_assignment(node: &SyntaxNode, _context: &TraversalContext<'_>) -> Option<String> {
    match &node.kind {
        SyntaxKind::Assign {
            targets,
            value: Some(value),
        } if value.is_none_literal() => {
            let names = targets
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join("', '");
            Some(format!("Assigned None to variable '{names}'."))
        }
        _ => None,
    }
}

fn handlerless_try(node: &SyntaxNode, _context: &TraversalContext<'_>) -> Option<String> {
    let has_handler = node
        .children
        .iter()
        .any(|child| matches!(child.kind, SyntaxKind::ExceptHandler { .. }));

    (matches!(node.kind, SyntaxKind::Try) && !has_handler)
        .then(|| "Try block has no exception handlers.".to_string())
}
