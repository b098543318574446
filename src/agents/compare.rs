use super::{all_product_data_for, record_with};
use crate::engine::{HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::prompt::{self, PromptEngine};
use crate::providers::LlmRouter;
use std::sync::Arc;

/// Side-by-side comparison across every product the plan scraped.
pub struct CompareHandler {
    llm: Arc<LlmRouter>,
    prompts: Arc<PromptEngine>,
}

impl CompareHandler {
    pub fn new(llm: Arc<LlmRouter>, prompts: Arc<PromptEngine>) -> Self {
        Self { llm, prompts }
    }

    async fn run_inner(&self, state: &RunState, task: &Task) -> anyhow::Result<TaskRecord> {
        let products = all_product_data_for(task, state);
        if products.len() < 2 {
            anyhow::bail!(
                "comparison needs at least two scraped products, found {}",
                products.len()
            );
        }

        let titles: Vec<String> = products
            .iter()
            .map(|p| {
                p.get("title")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown product")
                    .to_string()
            })
            .collect();

        let mut ctx = tera::Context::new();
        ctx.insert("products_json", &serde_json::to_string_pretty(&products)?);
        let prompt_text = self.prompts.render(prompt::COMPARE, &ctx)?;

        let comparison = self
            .llm
            .run(
                &prompt_text,
                self.prompts.system_for(Action::Compare),
                state.deep_research,
            )
            .await?;

        Ok(record_with(|record| {
            record.comparison = Some(comparison);
            record.products_compared = Some(titles);
        }))
    }
}

impl TaskHandler for CompareHandler {
    fn action(&self) -> Action {
        Action::Compare
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}
