use crate::error::{Result, SyntaxError};
use crate::language::Language;
use crate::lower::Lowering;
use crate::tree::SyntaxNode;
use tree_sitter::{Node, Parser};

const MAX_SNIPPET_CHARS: usize = 40;

/// Deepest concrete-tree nesting handed to the recursive lowering and graph
/// compiler. Roughly 200 nested calls or brackets, the same order as
/// CPython's own nesting limit.
pub const MAX_TREE_DEPTH: usize = 500;

/// Parses source text into a [`SyntaxNode`] tree.
///
/// Malformed input is rejected as a whole: if tree-sitter had to recover
/// anywhere, the first error location is reported and no tree is returned.
pub struct SourceParser {
    parser: Parser,
    language: Language,
}

impl SourceParser {
    /// Create a parser for a language
    pub fn new(language: Language) -> Result<Self> {
        if !language.supports_ast() {
            return Err(SyntaxError::unsupported_language(language.as_str()));
        }

        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, language })
    }

    /// Create a Python parser
    pub fn python() -> Result<Self> {
        Self::new(Language::Python)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Parse source into a lowered syntax tree
    pub fn parse(&mut self, source: &str) -> Result<SyntaxNode> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::tree_sitter("Parser returned no tree"))?;

        let root = tree.root_node();
        if let Some(deep) = first_too_deep(root) {
            let position = deep.start_position();
            log::debug!(
                "Rejected {} source nested deeper than {MAX_TREE_DEPTH}",
                self.language.as_str()
            );
            return Err(SyntaxError::invalid(
                position.row + 1,
                position.column + 1,
                "too deeply nested",
            ));
        }
        if let Some(bad) = first_error(root) {
            let error = describe_error(bad, source);
            log::debug!("Rejected {} source: {error}", self.language.as_str());
            return Err(error);
        }

        let lowered = Lowering::new(source).module(root);
        log::debug!(
            "Lowered {} source into {} syntax nodes",
            self.language.as_str(),
            lowered.subtree_len()
        );
        Ok(lowered)
    }
}

/// Parse Python source with a fresh parser
pub fn parse_python(source: &str) -> Result<SyntaxNode> {
    SourceParser::python()?.parse(source)
}

/// First node, in pre-order, below `MAX_TREE_DEPTH`. Walks with a cursor so
/// the check itself cannot exhaust the stack.
fn first_too_deep(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        if depth > MAX_TREE_DEPTH {
            return Some(cursor.node());
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn describe_error(node: Node, source: &str) -> SyntaxError {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let snippet: String = node
            .utf8_text(source.as_bytes())
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else if snippet.chars().count() > MAX_SNIPPET_CHARS {
            let cut: String = snippet.chars().take(MAX_SNIPPET_CHARS).collect();
            format!("invalid syntax near `{cut}…`")
        } else {
            format!("invalid syntax near `{snippet}`")
        }
    };

    SyntaxError::invalid(position.row + 1, position.column + 1, message)
}
