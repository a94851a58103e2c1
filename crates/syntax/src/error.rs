use thiserror::Error;

/// Result type for syntax front-end operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors that can occur while turning source text into a syntax tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The source is not valid for the grammar
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Invalid {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unsupported language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl SyntaxError {
    /// Create a syntax error at a 1-based position
    pub fn invalid(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Invalid {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Whether this error means the user's source was malformed
    pub fn is_invalid_source(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}
