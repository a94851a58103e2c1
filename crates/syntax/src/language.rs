use crate::error::{Result, SyntaxError};
use std::path::Path;

/// Extensions recognised as some other language. These are refused rather
/// than parsed as Python.
const FOREIGN_EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("java", "java"),
    ("go", "go"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("rb", "ruby"),
];

/// Source language of an analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Python,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyw" | "pyi" => Language::Python,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Language::Unknown, Self::from_extension)
    }

    /// Name of the other language `path` is written in, judging by its
    /// extension. `None` for Python and for extensions nobody claims.
    pub fn foreign_name(path: impl AsRef<Path>) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        FOREIGN_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, name)| *name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Unknown => "unknown",
        }
    }

    /// Check if this language can be lowered into a syntax tree
    pub fn supports_ast(self) -> bool {
        matches!(self, Language::Python)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Language::Unknown => Err(SyntaxError::unsupported_language(self.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_extensions_in_any_case() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("PYI"), Language::Python);
        assert_eq!(Language::from_extension("rs"), Language::Unknown);
        assert_eq!(Language::from_path("src/main.py"), Language::Python);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
    }

    #[test]
    fn other_languages_are_named_for_refusal() {
        assert_eq!(Language::foreign_name("lib.rs"), Some("rust"));
        assert_eq!(Language::foreign_name("App.TSX"), Some("typescript"));
        assert_eq!(Language::foreign_name("script.py"), None);
        assert_eq!(Language::foreign_name("notes.txt"), None);
        assert_eq!(Language::foreign_name("Makefile"), None);
    }

    #[test]
    fn only_python_has_a_grammar() {
        assert!(Language::Python.supports_ast());
        assert!(Language::Python.tree_sitter_language().is_ok());
        assert!(matches!(
            Language::Unknown.tree_sitter_language(),
            Err(SyntaxError::UnsupportedLanguage(_))
        ));
    }
}
