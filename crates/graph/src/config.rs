use serde::{Deserialize, Serialize};

/// Configuration for graph compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum characters of source text quoted in a label (0 = unlimited)
    pub max_snippet_chars: usize,

    /// Treat bodies made only of `pass`, `...` or a docstring as empty
    pub placeholder_bodies_are_empty: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: 48,
            placeholder_bodies_are_empty: true,
        }
    }
}

impl CompilerConfig {
    /// Only literally empty bodies count as empty
    pub fn strict_bodies() -> Self {
        Self {
            placeholder_bodies_are_empty: false,
            ..Default::default()
        }
    }
}
