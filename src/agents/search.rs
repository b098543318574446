use super::record_with;
use crate::engine::{HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::services::{extract_product_urls, TavilyClient};
use std::sync::Arc;

/// Web search over retailer sites. Produces the candidate product URLs the
/// rest of the plan scrapes from.
pub struct SearchHandler {
    search: Arc<TavilyClient>,
}

impl SearchHandler {
    pub fn new(search: Arc<TavilyClient>) -> Self {
        Self { search }
    }

    async fn run_inner(&self, state: &RunState, task: &Task) -> anyhow::Result<TaskRecord> {
        let query = task.query.as_deref().unwrap_or(&state.query);
        let response = self.search.search(query).await?;
        if response.results.is_empty() {
            anyhow::bail!("no search results for query: {query}");
        }

        let product_urls = extract_product_urls(&response);
        tracing::info!(
            query,
            results = response.results.len(),
            product_urls = product_urls.len(),
            "search completed"
        );

        Ok(record_with(|record| {
            record.extra.insert(
                "results_count".into(),
                serde_json::json!(response.results.len()),
            );
            record.search_results = serde_json::to_value(&response.results).ok();
            record.product_urls = Some(product_urls);
        }))
    }
}

impl TaskHandler for SearchHandler {
    fn action(&self) -> Action {
        Action::Search
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}
