//! Structural properties of the dispatcher: termination, progress shape,
//! result immutability, and failure isolation.

use crate::support::{dispatcher, stub_registry, AlwaysFails, OfflinePlanner};
use futures_util::StreamExt;
use shopscout::engine::{
    Dispatcher, HandlerRegistry, RunState, RunStatus, StepName, TaskRecord,
};
use shopscout::planner::{Action, Plan, Task};
use std::sync::Arc;

fn plan_of_n_scrapes(n: usize) -> Plan {
    Plan {
        intent: "product_research".into(),
        tasks: (0..n)
            .map(|_| Task::new(Action::Scrape).with_query("https://x.example/dp/1"))
            .collect(),
        reasoning: None,
    }
}

#[tokio::test]
async fn terminates_for_any_plan_size_even_when_every_task_fails() {
    for n in [0, 1, 2, 5, 17, 50] {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(AlwaysFails(Action::Scrape)));
        let d = dispatcher(plan_of_n_scrapes(n), registry);

        let state = d.run_to_completion(RunState::new("q", false)).await;
        assert_eq!(state.status, RunStatus::Done, "run of {n} tasks must finish");
        assert_eq!(state.current_task_index, n);
        assert_eq!(state.task_results.len(), n, "one record per task at n={n}");
        assert!(state.final_report.is_some());
    }
}

#[tokio::test]
async fn progress_is_monotone_and_terminal_event_reports_100() {
    let d = dispatcher(plan_of_n_scrapes(7), stub_registry());
    let stream = d.run_stream(RunState::new("q", false));
    futures_util::pin_mut!(stream);

    let mut previous = 0u8;
    let mut last_step = None;
    while let Some(event) = stream.next().await {
        assert!(
            event.progress >= previous,
            "progress went from {previous} to {}",
            event.progress
        );
        previous = event.progress;
        last_step = Some(event.step);
    }
    assert_eq!(previous, 100);
    assert_eq!(last_step, Some(StepName::Finalize));
}

#[tokio::test]
async fn event_count_is_plan_length_plus_two() {
    let d = dispatcher(plan_of_n_scrapes(4), stub_registry());
    let stream = d.run_stream(RunState::new("q", false));
    futures_util::pin_mut!(stream);
    let events: Vec<_> = stream.collect().await;
    assert_eq!(events.len(), 4 + 2);
    assert_eq!(events[0].step, StepName::Planner);
    assert!(events[1..=4]
        .iter()
        .all(|e| e.step == StepName::TaskExecutor));
}

#[tokio::test]
async fn earlier_records_never_change_as_the_run_advances() {
    let d = dispatcher(plan_of_n_scrapes(5), stub_registry());
    let stream = d.run_stream(RunState::new("q", false));
    futures_util::pin_mut!(stream);

    let mut snapshots: Vec<std::collections::BTreeMap<usize, TaskRecord>> = Vec::new();
    while let Some(event) = stream.next().await {
        snapshots.push(event.state.task_results.clone());
    }

    let terminal = snapshots.last().unwrap();
    for snapshot in &snapshots {
        for (index, record) in snapshot {
            assert_eq!(
                terminal.get(index),
                Some(record),
                "record {index} changed after it was written"
            );
        }
    }
}

#[tokio::test]
async fn unknown_action_is_an_error_record_not_a_crash() {
    let plan = Plan {
        intent: "product_research".into(),
        tasks: vec![
            Task::new(Action::Unknown),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };
    let d = dispatcher(plan, stub_registry());
    let state = d.run_to_completion(RunState::new("q", false)).await;

    assert_eq!(state.status, RunStatus::Done);
    let record = &state.task_results[&0];
    assert!(record.error.as_deref().unwrap().contains("unknown action"));
    // The plan still ran to its end.
    assert!(state.task_results[&1].final_report.is_some());
}

#[tokio::test]
async fn one_failing_task_does_not_poison_its_neighbours() {
    let plan = Plan {
        intent: "product_research".into(),
        tasks: vec![
            Task::new(Action::Search).with_query("usb hub"),
            Task::new(Action::Summarize).with_from_task("task:0"),
            Task::new(Action::Finalize),
        ],
        reasoning: None,
    };
    // No summarize handler registered: task 1 becomes an error record.
    let d = dispatcher(plan, stub_registry());
    let state = d.run_to_completion(RunState::new("q", false)).await;

    assert!(state.task_results[&0].product_urls.is_some());
    assert!(state.task_results[&1].is_error());
    assert!(state.final_report.is_some());
}

#[tokio::test]
async fn planner_outage_falls_back_to_a_deterministic_plan() {
    let d = Dispatcher::new(Arc::new(OfflinePlanner), Arc::new(stub_registry()));
    let state = d
        .run_to_completion(RunState::new("https://a.example/dp/1", false))
        .await;

    // URL queries fall back to scrape-first plans.
    let plan = state.plan.as_ref().unwrap();
    assert_eq!(plan.tasks[0].action, Action::Scrape);
    assert_eq!(state.status, RunStatus::Done);
    assert!(state
        .final_report
        .as_deref()
        .unwrap()
        .contains("Scraped 1 product pages"));
}
