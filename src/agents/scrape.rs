use super::record_with;
use crate::engine::{resolver, HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::services::PageScraper;
use std::sync::Arc;

/// Fetches one product page and records its structured extract.
pub struct ScrapeHandler {
    scraper: Arc<PageScraper>,
}

impl ScrapeHandler {
    pub fn new(scraper: Arc<PageScraper>) -> Self {
        Self { scraper }
    }

    async fn run_inner(&self, state: &RunState, task: &Task) -> anyhow::Result<TaskRecord> {
        let Some(url) = resolver::resolve_url(task, &state.task_results) else {
            anyhow::bail!("no URL to scrape: task has no query URL and its references carry none");
        };

        let data = self.scraper.scrape(&url).await?;
        tracing::info!(
            url,
            title = data.title.as_deref().unwrap_or("<none>"),
            substantial = data.is_substantial(),
            "scrape completed"
        );

        Ok(record_with(|record| {
            record.url = Some(url);
            record.product_data = serde_json::to_value(&data).ok();
        }))
    }
}

impl TaskHandler for ScrapeHandler {
    fn action(&self) -> Action {
        Action::Scrape
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}
