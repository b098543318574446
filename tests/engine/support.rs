//! Shared stubs for the engine integration tests: a canned planner and a few
//! deterministic handlers that stand in for the network-bound ones.

use shopscout::engine::{
    Dispatcher, HandlerFuture, HandlerRegistry, RunState, TaskHandler, TaskRecord,
};
use shopscout::planner::{Action, Plan, PlanFuture, PlannerService, Task};
use std::sync::Arc;

pub struct CannedPlanner {
    pub plan: Plan,
}

impl PlannerService for CannedPlanner {
    fn plan<'a>(&'a self, _query: &'a str) -> PlanFuture<'a> {
        let plan = self.plan.clone();
        Box::pin(async move { Ok(plan) })
    }
}

pub struct OfflinePlanner;

impl PlannerService for OfflinePlanner {
    fn plan<'a>(&'a self, _query: &'a str) -> PlanFuture<'a> {
        Box::pin(async { Err(anyhow::anyhow!("model unreachable")) })
    }
}

/// Search stub: always finds the same two product pages.
pub struct StubSearch;

impl TaskHandler for StubSearch {
    fn action(&self) -> Action {
        Action::Search
    }

    fn run<'a>(&'a self, _state: &'a RunState, _task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(async {
            let mut record = TaskRecord::default();
            record.product_urls = Some(vec![
                "https://a.example/dp/1".into(),
                "https://b.example/dp/2".into(),
            ]);
            record
                .extra
                .insert("results_count".into(), serde_json::json!(2));
            Ok(record)
        })
    }
}

/// Scrape stub: records the URL the resolver picked for it.
pub struct StubScrape;

impl TaskHandler for StubScrape {
    fn action(&self) -> Action {
        Action::Scrape
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(async move {
            let url = shopscout::engine::resolver::resolve_url(task, &state.task_results)
                .ok_or_else(|| anyhow::anyhow!("no URL to scrape"))?;
            let mut record = TaskRecord::default();
            record.product_data = Some(serde_json::json!({
                "url": url,
                "title": format!("Product at {url}"),
                "price": "$19.99",
            }));
            record.url = Some(url);
            Ok(record)
        })
    }
}

/// Finalize stub: stitches a report out of whatever the run collected.
pub struct StubFinalize;

impl TaskHandler for StubFinalize {
    fn action(&self) -> Action {
        Action::Finalize
    }

    fn run<'a>(&'a self, state: &'a RunState, _task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(async move {
            let scraped = state
                .task_results
                .values()
                .filter(|r| r.product_data.is_some())
                .count();
            let mut record = TaskRecord::default();
            record.final_report = Some(format!(
                "# Report for {}\n\nScraped {scraped} product pages.",
                state.query
            ));
            Ok(record)
        })
    }
}

pub struct AlwaysFails(pub Action);

impl TaskHandler for AlwaysFails {
    fn action(&self) -> Action {
        self.0
    }

    fn run<'a>(&'a self, _state: &'a RunState, _task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(async { Err(anyhow::anyhow!("simulated failure")) })
    }
}

pub fn stub_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(StubSearch));
    registry.register(Arc::new(StubScrape));
    registry.register(Arc::new(StubFinalize));
    registry
}

pub fn dispatcher(plan: Plan, registry: HandlerRegistry) -> Dispatcher {
    Dispatcher::new(Arc::new(CannedPlanner { plan }), Arc::new(registry))
}
