//! Gateway round-trips against a real ephemeral listener, with the network-
//! bound handlers stubbed out.

use crate::support::{stub_registry, CannedPlanner};
use shopscout::engine::Dispatcher;
use shopscout::gateway::{serve_with_listener, AppState};
use shopscout::planner::{Action, Plan, Task};
use shopscout::store::{ReportStore, SqliteReportStore, StoredReport};
use std::sync::Arc;

async fn start_gateway(store: Arc<dyn ReportStore>) -> String {
    let plan = Plan {
        intent: "product_research".into(),
        tasks: vec![
            Task::new(Action::Search).with_query("usb hub"),
            Task::new(Action::Scrape).with_from_task("task:0"),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(CannedPlanner { plan }),
        Arc::new(stub_registry()),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral listener should bind");
    let addr = listener.local_addr().expect("listener has a local address");
    tokio::spawn(serve_with_listener(listener, AppState { dispatcher, store }));
    format!("http://{addr}")
}

async fn in_memory_store() -> Arc<dyn ReportStore> {
    Arc::new(
        SqliteReportStore::in_memory()
            .await
            .expect("in-memory store should open"),
    )
}

#[tokio::test]
async fn health_reports_service_identity() {
    let base = start_gateway(in_memory_store().await).await;
    let body: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "shopscout");
}

#[tokio::test]
async fn sync_research_returns_the_finished_report() {
    let base = start_gateway(in_memory_store().await).await;
    let client = reqwest::Client::new();
    let body: serde_json::Value = client
        .post(format!("{base}/research/sync"))
        .json(&serde_json::json!({ "query": "usb hub" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["intent"], "product_research");
    assert!(body["report"].as_str().unwrap().contains("usb hub"));
    assert!(!body["report_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let base = start_gateway(in_memory_store().await).await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/research/sync"))
        .json(&serde_json::json!({ "query": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn streaming_research_emits_ndjson_with_report_id_first() {
    let base = start_gateway(in_memory_store().await).await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/research"))
        .json(&serde_json::json!({ "query": "usb hub" }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["content-type"],
        "application/x-ndjson"
    );

    let body = response.text().await.unwrap();
    let lines: Vec<serde_json::Value> = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("each line is standalone JSON"))
        .collect();

    assert_eq!(lines[0]["type"], "report_id");
    // planner + 3 tasks + terminal line, after the id line.
    assert_eq!(lines.len(), 1 + 3 + 2);

    // Every step line carries the run-state snapshot at that point.
    for step_line in &lines[1..] {
        let state = &step_line["state"];
        assert!(state["run_id"].is_string());
        assert_eq!(state["query"], "usb hub");
    }
    assert_eq!(lines[1]["state"]["status"], "planning");
    assert_eq!(
        lines[2]["state"]["task_results"]["0"]["results_count"],
        2,
        "task records appear in the snapshot as they are written"
    );

    let last = lines.last().unwrap();
    assert_eq!(last["type"], "complete");
    assert_eq!(last["progress"], 100);
    assert!(last["report"].as_str().unwrap().contains("usb hub"));
    assert_eq!(last["state"]["status"], "done");
}

#[tokio::test]
async fn history_lists_and_fetches_persisted_reports() {
    let store = in_memory_store().await;
    store
        .save(&StoredReport {
            id: "r-history".into(),
            query: "standing desks".into(),
            intent: "product_research".into(),
            deep_research: false,
            report: "# Standing Desks".into(),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
    let base = start_gateway(store).await;

    let listing: serde_json::Value = reqwest::get(format!("{base}/history/reports"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["reports"][0]["id"], "r-history");

    let report: serde_json::Value =
        reqwest::get(format!("{base}/history/reports/r-history"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(report["report"], "# Standing Desks");

    let missing = reqwest::get(format!("{base}/history/reports/nope"))
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}
