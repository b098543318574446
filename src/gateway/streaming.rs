use crate::engine::{Dispatcher, RunState, StepName};
use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::Response;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

/// Stream a research run as newline-delimited JSON.
///
/// The first line carries the report id so clients can poll history even if
/// the connection drops mid-run. Each subsequent line is one step event; the
/// terminal line carries the full report.
pub fn ndjson_research_response(dispatcher: Arc<Dispatcher>, run: RunState) -> Response {
    let stream = async_stream::stream! {
        yield line(&json!({ "type": "report_id", "report_id": run.run_id.clone() }));

        let events = dispatcher.run_stream(run);
        futures_util::pin_mut!(events);
        while let Some(event) = futures_util::StreamExt::next(&mut events).await {
            if event.step == StepName::Finalize {
                yield line(&json!({
                    "type": "complete",
                    "step": event.step.as_str(),
                    "progress": event.progress,
                    "intent": event.state.intent(),
                    "report": event.state.final_report,
                    "state": event.state,
                }));
            } else {
                let mut chunk = json!({
                    "type": "step",
                    "step": event.step.as_str(),
                    "progress": event.progress,
                    "description": event.description,
                    "state": event.state,
                });
                if let Some(meta) = event.meta {
                    chunk["action"] = json!(meta.action);
                    chunk["task_index"] = json!(meta.task_index);
                    chunk["total_tasks"] = json!(meta.total_tasks);
                }
                yield line(&chunk);
            }
        }
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn line(value: &serde_json::Value) -> Result<Bytes, Infallible> {
    let mut out = value.to_string();
    out.push('\n');
    Ok(Bytes::from(out))
}
