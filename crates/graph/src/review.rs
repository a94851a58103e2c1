//! Decoding of generative model replies.
//!
//! Model output is untrusted text. It goes through [`flex_recovery`] first
//! and is then decoded field by field: anything missing or mistyped falls
//! back to an empty default instead of failing the request. When no JSON
//! object can be recovered at all, the raw reply is surfaced as prose.

use crate::types::{id_string, ConceptGraph};
use flex_protocol::{ErrorReport, Explanation, HighLevelFeedback};
use flex_recovery::recover;
use serde_json::{Map, Value};

/// A model's review of one program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReview {
    pub feedback: HighLevelFeedback,

    /// Defect reports keyed by concept-node id
    pub errors: Vec<ErrorReport>,

    /// Graph proposed by the model, when the reply carried one
    pub graph: Option<ConceptGraph>,

    /// False when the reply held no JSON object and `feedback.summary` is the
    /// raw text
    pub recovered: bool,
}

impl ModelReview {
    pub fn from_model_text(text: &str) -> Self {
        match recover(text) {
            Some(Value::Object(object)) => Self::from_object(&object),
            _ => {
                log::warn!("Model review held no JSON object; using raw text as summary");
                Self {
                    feedback: HighLevelFeedback {
                        summary: text.trim().to_string(),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            }
        }
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let feedback = object
            .get("high_level_feedback")
            .map(decode_feedback)
            .unwrap_or_default();

        let errors = object
            .get("errors")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().filter_map(decode_report).collect())
            .unwrap_or_default();

        let graph = ConceptGraph::from_model_value(&Value::Object(object.clone()))
            .filter(|graph| graph.node_count() > 0);

        Self {
            feedback,
            errors,
            graph,
            recovered: true,
        }
    }
}

/// Decode a node explanation reply.
///
/// Accepts the explanation at the top level or nested under
/// `"explanation"`. Without a recoverable object the raw text becomes the
/// description.
pub fn explanation_from_model_text(text: &str) -> Explanation {
    let recovered = recover(text);
    let object = match &recovered {
        Some(Value::Object(object)) => match object.get("explanation") {
            Some(Value::Object(nested)) => nested,
            _ => object,
        },
        _ => {
            log::warn!("Explanation reply held no JSON object; using raw text");
            return raw_explanation(text);
        }
    };

    let Some(description) = non_empty_str(object.get("description")) else {
        return Explanation {
            concepts: string_list(object.get("concepts")),
            issues: string_list(object.get("issues")),
            suggestions: string_list(object.get("suggestions")),
            ..raw_explanation(text)
        };
    };

    Explanation {
        description,
        concepts: string_list(object.get("concepts")),
        issues: string_list(object.get("issues")),
        suggestions: string_list(object.get("suggestions")),
    }
}

fn raw_explanation(text: &str) -> Explanation {
    Explanation {
        description: text.trim().to_string(),
        ..Default::default()
    }
}

fn decode_feedback(value: &Value) -> HighLevelFeedback {
    HighLevelFeedback {
        summary: non_empty_str(value.get("summary")).unwrap_or_default(),
        strengths: string_list(value.get("strengths")).unwrap_or_default(),
        weaknesses: string_list(value.get("weaknesses")).unwrap_or_default(),
        recommendations: string_list(value.get("recommendations")).unwrap_or_default(),
    }
}

fn decode_report(value: &Value) -> Option<ErrorReport> {
    Some(ErrorReport {
        id: id_string(value.get("id")?)?,
        description: non_empty_str(value.get("description"))?,
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// A single string counts as a one-item list
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| non_empty_str(Some(item)))
                .collect(),
        ),
        Value::String(_) => non_empty_str(value).map(|text| vec![text]),
        _ => None,
    }
}
