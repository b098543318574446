use super::{product_data_for, record_with};
use crate::engine::{HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::prompt::{self, PromptEngine};
use crate::providers::LlmRouter;
use std::sync::Arc;

/// Turns one scraped product record into a buyer-oriented prose summary.
pub struct SummarizeHandler {
    llm: Arc<LlmRouter>,
    prompts: Arc<PromptEngine>,
}

impl SummarizeHandler {
    pub fn new(llm: Arc<LlmRouter>, prompts: Arc<PromptEngine>) -> Self {
        Self { llm, prompts }
    }

    async fn run_inner(&self, state: &RunState, task: &Task) -> anyhow::Result<TaskRecord> {
        let Some(data) = product_data_for(task, state) else {
            anyhow::bail!("no product data to summarize; run a scrape task first");
        };

        let mut ctx = tera::Context::new();
        ctx.insert("product_json", &serde_json::to_string_pretty(data)?);
        let prompt_text = self.prompts.render(prompt::SUMMARIZE, &ctx)?;

        let summary = self
            .llm
            .run(
                &prompt_text,
                self.prompts.system_for(Action::Summarize),
                state.deep_research,
            )
            .await?;

        Ok(record_with(|record| {
            record.summary = Some(summary);
            if let Some(title) = data.get("title").and_then(|t| t.as_str()) {
                record
                    .extra
                    .insert("product_title".into(), serde_json::json!(title));
            }
        }))
    }
}

impl TaskHandler for SummarizeHandler {
    fn action(&self) -> Action {
        Action::Summarize
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}
