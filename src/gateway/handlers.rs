use super::streaming::ndjson_research_response;
use super::AppState;
use crate::engine::RunState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub deep_research: bool,
}

#[derive(Debug, Serialize)]
pub struct FinalResearchReport {
    pub report_id: String,
    pub query: String,
    pub intent: String,
    pub report: String,
    /// First product summary of the run, kept for older clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<serde_json::Value>,
    pub task_results: serde_json::Value,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn research_stream(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "query must not be empty").into_response();
    }
    let run = RunState::new(request.query, request.deep_research);
    ndjson_research_response(state.dispatcher, run)
}

pub async fn research_sync(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "query must not be empty").into_response();
    }
    let run = RunState::new(request.query, request.deep_research);
    let done = state.dispatcher.run_to_completion(run).await;

    let summary = done
        .task_results
        .values()
        .find_map(|record| record.summary.clone());
    let sentiment = done
        .task_results
        .values()
        .find_map(|record| record.sentiment.clone());

    Json(FinalResearchReport {
        report_id: done.run_id.clone(),
        query: done.query.clone(),
        intent: done.intent().to_string(),
        report: done.final_report.clone().unwrap_or_default(),
        summary,
        sentiment,
        task_results: serde_json::to_value(&done.task_results).unwrap_or_default(),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    match state.store.list(params.limit.min(100)).await {
        Ok(reports) => Json(json!({ "reports": reports })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to list reports");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_report(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "report not found").into_response(),
        Err(err) => {
            tracing::error!(error = %err, report_id = %id, "failed to load report");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
