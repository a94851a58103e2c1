use crate::compiler::GraphCompiler;
use crate::config::CompilerConfig;
use crate::error::Result;
use crate::review::ModelReview;
use crate::types::ConceptGraph;
use flex_protocol::{AnalyzeResponse, FlowGraph, HighLevelFeedback};

/// Where the rendered graph came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    /// Compiled from the syntax tree
    Compiled,
    /// Proposed by the model review
    Model,
}

/// Result of analyzing one program
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub graph: FlowGraph,
    pub source: GraphSource,
    pub feedback: Option<HighLevelFeedback>,
}

impl Analysis {
    pub fn labels(&self) -> Vec<String> {
        self.graph
            .nodes
            .iter()
            .map(|node| node.data.label.clone())
            .collect()
    }

    pub fn into_response(self, hints: Vec<String>) -> AnalyzeResponse {
        AnalyzeResponse {
            graph: self.graph,
            high_level_feedback: self.feedback,
            hints,
        }
    }
}

/// Source → syntax tree → concept graph → renderer graph, optionally merged
/// with a model review.
///
/// Syntax errors abort the analysis. Review problems never do: an
/// unparseable review becomes prose feedback.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    compiler: GraphCompiler,
    prefer_model_graph: bool,
}

impl Analyzer {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            compiler: GraphCompiler::new(config),
            prefer_model_graph: false,
        }
    }

    #[must_use]
    pub fn with_compiler(mut self, compiler: GraphCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Render the model's own graph, when it sends one, instead of the
    /// compiled tree
    #[must_use]
    pub fn prefer_model_graph(mut self, prefer: bool) -> Self {
        self.prefer_model_graph = prefer;
        self
    }

    pub fn analyze(&self, source: &str, review: Option<&str>) -> Result<Analysis> {
        let compiled = self.compiler.compile_source(source)?;

        let Some(review_text) = review else {
            return Ok(Analysis {
                graph: compiled.normalize(None),
                source: GraphSource::Compiled,
                feedback: None,
            });
        };

        let review = ModelReview::from_model_text(review_text);
        let (graph, origin): (ConceptGraph, GraphSource) = match review.graph {
            Some(model_graph) if self.prefer_model_graph => {
                if !model_graph.is_tree() {
                    log::debug!("Model graph is not a tree; rendering it as sent");
                }
                (model_graph, GraphSource::Model)
            }
            _ => (compiled, GraphSource::Compiled),
        };

        log::debug!(
            "Merging {} review reports into {:?} graph",
            review.errors.len(),
            origin
        );

        Ok(Analysis {
            graph: graph.normalize(Some(&review.errors)),
            source: origin,
            feedback: Some(review.feedback),
        })
    }
}
