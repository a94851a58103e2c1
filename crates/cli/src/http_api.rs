use crate::history::HistoryStore;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use flex_graph::{explanation_from_model_text, Analyzer, GraphError};
use flex_protocol::{
    AnalyzeRequest, AnalyzeResponse, ErrorEnvelope, ExplainRequest, ExplainResponse,
    HistoryEntry, RecoverRequest, RecoverResponse,
};
use flex_syntax::SyntaxError;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

pub(crate) struct HttpState {
    pub(crate) analyzer: Analyzer,
    pub(crate) history: Option<HistoryStore>,
}

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/recover", post(recover))
        .route("/api/explain", post(explain))
        .route("/api/history", get(history))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Analysis(#[from] GraphError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(err) if err.is_syntax_error() => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn envelope(&self) -> ErrorEnvelope {
        let (code, details, hint) = match self {
            ApiError::InvalidRequest(_) => (
                "invalid_request",
                None,
                Some("Verify the request is valid JSON with the documented fields."),
            ),
            ApiError::Analysis(GraphError::Syntax(SyntaxError::Invalid { line, column, .. })) => (
                "syntax_error",
                Some(json!({ "line": line, "column": column })),
                Some("Fix the reported syntax error and resubmit the code."),
            ),
            ApiError::Analysis(_) | ApiError::Internal(_) => ("internal", None, None),
        };

        ErrorEnvelope {
            code: code.to_string(),
            message: self.to_string(),
            details,
            hint: hint.map(str::to_string),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::debug!("Rejected request: {self}");
        }
        (status, Json(self.envelope())).into_response()
    }
}

/// Analyze `request.code`, then record it in the history when one is
/// configured. History failures are logged and never fail the analysis.
pub(crate) fn run_analysis(
    state: &HttpState,
    request: &AnalyzeRequest,
) -> Result<AnalyzeResponse, ApiError> {
    let analysis = state
        .analyzer
        .analyze(&request.code, request.review.as_deref())?;

    let hints = match &state.history {
        Some(store) => store
            .record(&request.code, &analysis.labels())
            .unwrap_or_else(|err| {
                log::warn!("History update failed: {err:#}");
                Vec::new()
            }),
        None => Vec::new(),
    };

    Ok(analysis.into_response(hints))
}

pub(crate) fn run_recover(request: &RecoverRequest) -> RecoverResponse {
    match flex_recovery::recover(&request.text) {
        Some(value) => RecoverResponse { found: true, value },
        None => RecoverResponse {
            found: false,
            value: Value::Null,
        },
    }
}

async fn analyze(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let response = tokio::task::spawn_blocking(move || run_analysis(&state, &request))
        .await
        .map_err(|err| ApiError::Internal(format!("Analysis task failed: {err}")))??;
    Ok(Json(response))
}

async fn recover(
    payload: Result<Json<RecoverRequest>, JsonRejection>,
) -> Result<Json<RecoverResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(run_recover(&request)))
}

async fn explain(
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let Json(request) = payload?;
    let explanation = explanation_from_model_text(&request.model_response);
    Ok(Json(ExplainResponse::new(request.node_label, explanation)))
}

async fn history(State(state): State<Arc<HttpState>>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let Some(store) = state.history.clone() else {
        return Ok(Json(Vec::new()));
    };
    let entries = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|err| ApiError::Internal(format!("History task failed: {err}")))?
        .map_err(|err| ApiError::Internal(format!("{err:#}")))?;
    Ok(Json(entries))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
