//! # FLEX Syntax
//!
//! Syntax front-end for the FLEX analyzer: turns Python source into a small,
//! closed syntax tree that the graph compiler can walk without knowing about
//! tree-sitter.
//!
//! ## Architecture
//!
//! ```text
//! Source Code
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> Tree-sitter Parsing → CST
//!     │      ├─> nesting past MAX_TREE_DEPTH → SyntaxError::Invalid
//!     │      └─> any ERROR / MISSING node → SyntaxError::Invalid
//!     │
//!     └──> Lowering → SyntaxNode tree
//!          ├─> statements become nodes
//!          ├─> calls, comparisons, lambdas, comprehensions become nodes
//!          └─> other expressions become Expr text (+ literal class)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use flex_syntax::{parse_python, SyntaxKind};
//!
//! let tree = parse_python("def greet(name):\n    print(name)\n").unwrap();
//! assert!(matches!(tree.children[0].kind, SyntaxKind::FunctionDef { .. }));
//! ```

mod error;
mod language;
mod lower;
mod parser;
mod tree;

pub use error::{Result, SyntaxError};
pub use language::Language;
pub use parser::{parse_python, SourceParser, MAX_TREE_DEPTH};
pub use tree::{ComprehensionFlavor, Expr, Literal, SyntaxKind, SyntaxNode};
