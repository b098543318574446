use super::{product_data_for, record_with};
use crate::engine::{HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::prompt::{self, PromptEngine};
use crate::providers::LlmRouter;
use std::sync::Arc;

/// Reads the rating signals of a scraped product and asks the model for a
/// structured sentiment verdict.
pub struct SentimentHandler {
    llm: Arc<LlmRouter>,
    prompts: Arc<PromptEngine>,
}

impl SentimentHandler {
    pub fn new(llm: Arc<LlmRouter>, prompts: Arc<PromptEngine>) -> Self {
        Self { llm, prompts }
    }

    async fn run_inner(&self, state: &RunState, task: &Task) -> anyhow::Result<TaskRecord> {
        let Some(data) = product_data_for(task, state) else {
            anyhow::bail!("no product data for sentiment analysis; run a scrape task first");
        };

        let mut ctx = tera::Context::new();
        ctx.insert("product_json", &serde_json::to_string_pretty(data)?);
        let prompt_text = self.prompts.render(prompt::SENTIMENT, &ctx)?;

        let verdict = self
            .llm
            .run_structured(
                &prompt_text,
                self.prompts.system_for(Action::Sentiment),
                state.deep_research,
            )
            .await?;

        Ok(record_with(|record| {
            // Carry the raw signals alongside the verdict for the report step.
            if let Some(rating) = data.get("rating") {
                record.extra.insert("rating".into(), rating.clone());
            }
            if let Some(count) = data.get("review_count") {
                record.extra.insert("review_count".into(), count.clone());
            }
            record.sentiment = Some(verdict);
        }))
    }
}

impl TaskHandler for SentimentHandler {
    fn action(&self) -> Action {
        Action::Sentiment
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}
