//! End-to-end run through the reference-resolution chain: search feeds
//! scrape through `task:` references, finalize reads the collected data.

use crate::support::{dispatcher, stub_registry};
use shopscout::engine::RunState;
use shopscout::planner::{Action, Plan, Task};

#[tokio::test]
async fn search_scrape_finalize_chain_resolves_references() {
    let plan = Plan {
        intent: "product_comparison".into(),
        tasks: vec![
            Task::new(Action::Search).with_query("wireless earbuds"),
            Task::new(Action::Scrape)
                .with_from_task("task:0")
                .with_url_index(0),
            Task::new(Action::Scrape)
                .with_from_task("task:0")
                .with_url_index(1),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };
    let d = dispatcher(plan, stub_registry());
    let state = d
        .run_to_completion(RunState::new("wireless earbuds", false))
        .await;

    // Each scrape picked its own URL out of the search result list.
    assert_eq!(
        state.task_results[&1].url.as_deref(),
        Some("https://a.example/dp/1")
    );
    assert_eq!(
        state.task_results[&2].url.as_deref(),
        Some("https://b.example/dp/2")
    );
    assert!(state
        .final_report
        .as_deref()
        .unwrap()
        .contains("Scraped 2 product pages"));
}

#[tokio::test]
async fn reference_resolution_is_deterministic_across_runs() {
    let plan = Plan {
        intent: "product_research".into(),
        tasks: vec![
            Task::new(Action::Search).with_query("usb hub"),
            Task::new(Action::Scrape).with_from_task("task:0"),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };

    let mut reports = Vec::new();
    for _ in 0..3 {
        let d = dispatcher(plan.clone(), stub_registry());
        let state = d.run_to_completion(RunState::new("usb hub", false)).await;
        assert_eq!(
            state.task_results[&1].url.as_deref(),
            Some("https://a.example/dp/1"),
            "unindexed scrape must take the first product URL"
        );
        reports.push(state.final_report.unwrap());
    }
    assert!(reports.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn forward_reference_resolves_to_nothing_and_is_recorded() {
    let plan = Plan {
        intent: "product_research".into(),
        tasks: vec![
            Task::new(Action::Scrape).with_from_task("task:1"),
            Task::new(Action::Search).with_query("usb hub"),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };
    let d = dispatcher(plan, stub_registry());
    let state = d.run_to_completion(RunState::new("usb hub", false)).await;

    // Task 0 cannot see task 1's output and fails in isolation.
    assert!(state.task_results[&0].is_error());
    assert!(state.task_results[&1].product_urls.is_some());
    assert!(state.final_report.is_some());
}
