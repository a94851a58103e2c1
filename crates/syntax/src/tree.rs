use serde::{Deserialize, Serialize};

/// A node of the lowered syntax tree.
///
/// Children are kept in source order; the tree is never mutated after
/// lowering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Construct kind with its kind-specific payload
    pub kind: SyntaxKind,

    /// Start line (1-indexed, 0 when synthesized)
    pub line: usize,

    /// Nested constructs in source order
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node
    #[must_use]
    pub const fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            line: 0,
            children: Vec::new(),
        }
    }

    /// Builder: set start line
    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Builder: append a child
    #[must_use]
    pub fn child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: append several children
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SyntaxNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::subtree_len).sum::<usize>()
    }

    /// True for statements that only stand in for an absent body
    /// (`pass`, `...`, a bare docstring).
    pub fn is_placeholder(&self) -> bool {
        match &self.kind {
            SyntaxKind::Pass => true,
            SyntaxKind::Expr { value } => matches!(
                value.literal,
                Some(Literal::Ellipsis) | Some(Literal::Str)
            ),
            _ => false,
        }
    }
}

/// Closed set of constructs the analyzer understands.
///
/// Anything the lowering does not model explicitly is kept as
/// [`SyntaxKind::Other`] with the grammar's own kind name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyntaxKind {
    Module,
    FunctionDef {
        name: String,
        is_async: bool,
    },
    ClassDef {
        name: String,
    },
    For {
        target: Expr,
        iter: Expr,
    },
    While {
        test: Expr,
    },
    If {
        test: Expr,
    },
    With {
        items: String,
    },
    Assign {
        targets: Vec<Expr>,
        value: Option<Expr>,
    },
    AugAssign {
        target: Expr,
        op: String,
        value: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    Call {
        callee: String,
    },
    Compare {
        operands: Vec<Expr>,
        operators: Vec<String>,
    },
    Try,
    ExceptHandler {
        exception: Option<String>,
    },
    Comprehension {
        flavor: ComprehensionFlavor,
    },
    Lambda,
    Import {
        text: String,
    },
    Raise {
        exception: Option<String>,
    },
    Pass,
    Expr {
        value: Expr,
    },
    Other {
        kind: String,
    },
}

impl SyntaxKind {
    /// Discriminant name carried into graph nodes
    pub fn name(&self) -> &str {
        match self {
            SyntaxKind::Module => "Module",
            SyntaxKind::FunctionDef { .. } => "FunctionDef",
            SyntaxKind::ClassDef { .. } => "ClassDef",
            SyntaxKind::For { .. } => "For",
            SyntaxKind::While { .. } => "While",
            SyntaxKind::If { .. } => "If",
            SyntaxKind::With { .. } => "With",
            SyntaxKind::Assign { .. } => "Assign",
            SyntaxKind::AugAssign { .. } => "AugAssign",
            SyntaxKind::Return { .. } => "Return",
            SyntaxKind::Call { .. } => "Call",
            SyntaxKind::Compare { .. } => "Compare",
            SyntaxKind::Try => "Try",
            SyntaxKind::ExceptHandler { .. } => "ExceptHandler",
            SyntaxKind::Comprehension { .. } => "Comprehension",
            SyntaxKind::Lambda => "Lambda",
            SyntaxKind::Import { .. } => "Import",
            SyntaxKind::Raise { .. } => "Raise",
            SyntaxKind::Pass => "Pass",
            SyntaxKind::Expr { .. } => "Expr",
            SyntaxKind::Other { kind } => kind,
        }
    }

    /// Shorthand for an unmodelled construct
    pub fn other(kind: impl Into<String>) -> Self {
        SyntaxKind::Other { kind: kind.into() }
    }
}

/// Source text of an expression, with its literal classification when the
/// expression is a constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Expr {
    /// Whitespace-normalized source text
    pub text: String,

    /// Set when the expression is a literal constant
    pub literal: Option<Literal>,
}

impl Expr {
    /// Non-literal expression
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            literal: None,
        }
    }

    /// Literal constant expression
    pub fn literal(text: impl Into<String>, literal: Literal) -> Self {
        Self {
            text: text.into(),
            literal: Some(literal),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    /// `Some(b)` when this is the boolean constant `b`
    pub fn as_bool(&self) -> Option<bool> {
        match self.literal {
            Some(Literal::Bool(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_none_literal(&self) -> bool {
        matches!(self.literal, Some(Literal::None))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    None,
    Number,
    Str,
    Ellipsis,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComprehensionFlavor {
    List,
    Dict,
    Set,
    Generator,
}

impl ComprehensionFlavor {
    pub fn as_str(self) -> &'static str {
        match self {
            ComprehensionFlavor::List => "List",
            ComprehensionFlavor::Dict => "Dict",
            ComprehensionFlavor::Set => "Set",
            ComprehensionFlavor::Generator => "Generator",
        }
    }
}
