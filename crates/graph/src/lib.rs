//! # FLEX Graph
//!
//! Turns a program into a graph of human-readable concept nodes and flags
//! likely defects on the nodes where they occur.
//!
//! ## Architecture
//!
//! ```text
//! SyntaxNode (flex-syntax)
//!     │
//!     ├──> Graph Compiler (pre-order walk)
//!     │      ├─ Sequential ids, root = "0"
//!     │      ├─ Label per construct
//!     │      ├─ Heuristics (first matching rule)
//!     │      └─ Parent → child edges
//!     │
//!     ├──> ConceptGraph (raw nodes + edges)
//!     │
//!     └──> Normalizer
//!            ├─ Renderer schema (flex-protocol)
//!            └─ Merge model defect reports by node id
//! ```
//!
//! Model replies are decoded by [`ModelReview`] on top of
//! [`flex_recovery`], so a malformed reply degrades to prose instead of
//! failing the analysis.
//!
//! ## Example
//!
//! ```rust
//! use flex_graph::Analyzer;
//!
//! let analysis = Analyzer::default()
//!     .analyze("def todo():\n    pass\n", None)
//!     .unwrap();
//! let function = &analysis.graph.nodes[1];
//! assert_eq!(function.data.label, "Function: todo");
//! assert_eq!(
//!     function.data.error.as_deref(),
//!     Some("Function 'todo' has an empty body.")
//! );
//! ```

mod analysis;
mod compiler;
mod config;
mod error;
mod graph;
mod heuristics;
mod labels;
mod normalize;
mod review;
mod types;

pub use analysis::{Analysis, Analyzer, GraphSource};
pub use compiler::{compile, GraphCompiler};
pub use config::CompilerConfig;
pub use error::{GraphError, Result};
pub use heuristics::{HeuristicsEngine, Rule, RuleCheck, TraversalContext, BUILTIN_RULES};
pub use labels::label_for;
pub use normalize::normalize;
pub use review::{explanation_from_model_text, ModelReview};
pub use types::{ConceptGraph, GraphEdge, GraphNode};
